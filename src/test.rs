use hashbrown::HashSet;

use crate::{
    canonical::{canonical_id, decode},
    report, BucketKey, BucketOutcome, BucketStore, Collinearity, Compression, Family, FileStore,
    Generator, MemoryStore, ShapeId, StoreConfig,
};

fn computed(family: Family, collinearity: Collinearity, max_n: usize, k_limit: Option<usize>) -> MemoryStore {
    let store = MemoryStore::new();
    Generator::new(&store, family, collinearity)
        .create_range(1, max_n, k_limit)
        .unwrap();
    store
}

/// Every free shape of `n` cells, found by growing every shape in every
/// possible way.
fn all_shapes(family: Family, n: usize) -> HashSet<ShapeId> {
    let mut level: HashSet<ShapeId> = [ShapeId::single()].into_iter().collect();

    for _ in 1..n {
        let mut next = HashSet::new();
        for id in &level {
            let pattern = decode(family, id).unwrap();
            for p in pattern.iter() {
                for v in family.vectors() {
                    let added = p.add(*v);
                    if !pattern.contains(&added) {
                        next.insert(canonical_id(family, &pattern.with(added)).unwrap());
                    }
                }
            }
        }
        level = next;
    }

    level
}

#[test]
pub fn triangles() {
    #[rustfmt::skip]
    let expected = [
        (Family::Square, Collinearity::Plane, vec![
            1, 0, 1, 0, 1, 1, 0, 2, 2, 1, 0, 0, 9, 2, 1, 0, 0, 18, 13, 3, 1, 0, 0, 37, 48, 19, 3, 1,
        ]),
        (Family::Square, Collinearity::Lattice, vec![
            1, 0, 1, 0, 1, 1, 0, 2, 2, 1, 0, 1, 8, 2, 1, 0, 1, 17, 13, 3, 1, 0, 1, 39, 45, 19, 3, 1,
        ]),
        (Family::Hexagon, Collinearity::Plane, vec![
            1, 0, 1, 0, 2, 1, 0, 4, 2, 1, 0, 2, 16, 3, 1, 0, 3, 52, 23, 3, 1, 0, 0, 169, 129, 30, 4, 1,
        ]),
        (Family::Hexagon, Collinearity::Lattice, vec![
            1, 0, 1, 0, 2, 1, 0, 4, 2, 1, 0, 3, 15, 3, 1, 0, 5, 50, 23, 3, 1, 0, 1, 171, 126, 30, 4, 1,
        ]),
    ];

    for (family, collinearity, triangle) in expected {
        let store = computed(family, collinearity, 7, None);
        assert_eq!(
            report::triangle(&store, family, collinearity, 7).unwrap(),
            triangle,
            "{family} {collinearity}"
        );
    }
}

#[test]
pub fn free_polyomino_totals() {
    let store = computed(Family::Square, Collinearity::Plane, 8, None);
    let totals = report::row_totals(&store, Family::Square, Collinearity::Plane, 8, None).unwrap();
    assert_eq!(totals, vec![1, 1, 2, 5, 12, 35, 108, 369]);
}

#[test]
pub fn at_most_three_collinear() {
    let store = computed(Family::Square, Collinearity::Plane, 8, Some(3));
    let totals = report::row_totals(&store, Family::Square, Collinearity::Plane, 8, Some(3)).unwrap();
    assert_eq!(report::format_sequence(&totals), "1, 1, 2, 4, 9, 18, 37, 62");

    let store = computed(Family::Hexagon, Collinearity::Plane, 7, Some(3));
    let totals = report::row_totals(&store, Family::Hexagon, Collinearity::Plane, 7, Some(3)).unwrap();
    assert_eq!(totals, vec![1, 1, 3, 6, 18, 55, 169]);

    // Nothing beyond the limit is computed.
    let key = BucketKey::new(Family::Hexagon, Collinearity::Plane, 5, 4);
    assert!(!store.is_complete(key).unwrap());
}

#[test]
pub fn buckets_partition_all_shapes() {
    for family in Family::ALL {
        for collinearity in Collinearity::ALL {
            let store = computed(family, collinearity, 6, None);

            for n in 1..=6 {
                let mut seen = HashSet::new();
                for k in 1..=n {
                    let bucket = store.load(BucketKey::new(family, collinearity, n, k)).unwrap().unwrap();
                    for id in bucket.ids() {
                        assert!(seen.insert(id.clone()), "{id} is in two buckets");
                    }
                }

                assert_eq!(seen, all_shapes(family, n), "{family} {collinearity} n = {n}");
            }
        }
    }
}

#[test]
pub fn file_store_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let config = StoreConfig::new(dir.path()).with_compression(Compression::Gzip);
    let store = FileStore::new(config.clone());
    store.create_folder_structure().unwrap();

    let family = Family::Hexagon;
    let collinearity = Collinearity::Plane;
    let generator = Generator::new(&store, family, collinearity);

    let levels = generator.create_range(1, 6, None).unwrap();
    assert_eq!(levels.len(), 6);
    assert_eq!(levels[5].counts, vec![(1, 0), (2, 3), (3, 52), (4, 23), (5, 3), (6, 1)]);

    let key = BucketKey::new(family, collinearity, 6, 3);
    assert!(store.path(key).is_file());
    assert_eq!(generator.create_bucket(6, 3).unwrap(), BucketOutcome::Existing(52));
    let bucket = store.load(key).unwrap().unwrap();

    // A gzip file cut short is recomputed.
    let bytes = std::fs::read(store.path(key)).unwrap();
    std::fs::write(store.path(key), &bytes[..bytes.len() / 2]).unwrap();
    assert_eq!(generator.create_bucket(6, 3).unwrap(), BucketOutcome::Created(52));
    assert_eq!(store.load(key).unwrap(), Some(bucket.clone()));

    // So is a plain file missing rows.
    let reopened = FileStore::new(config.with_compression(Compression::None));
    let plain = reopened.path(key);
    let gz = store.path(key);
    let mut lines = vec![key.header(bucket.len())];
    lines.extend(bucket.lines().take(10));
    std::fs::write(&plain, lines.join("\n")).unwrap();
    std::fs::remove_file(gz).unwrap();

    let generator = Generator::new(&reopened, family, collinearity).parallel(false);
    assert_eq!(generator.create_bucket(6, 3).unwrap(), BucketOutcome::Created(52));
    assert_eq!(reopened.load(key).unwrap(), Some(bucket));

    let triangle = report::triangle(&reopened, family, collinearity, 6).unwrap();
    assert_eq!(triangle.iter().sum::<usize>(), 1 + 1 + 3 + 7 + 22 + 82);
}
