use std::time::Instant;

use indicatif::MultiProgress;
use polyominoes::{report, Collinearity, Family, FileStore, Generator};

use crate::EnumerateOpts;

/// Create every bucket up to `opts.max_n`, then print the table and the
/// row totals of what is stored.
pub fn enumerate(store: &FileStore, opts: &EnumerateOpts) -> polyominoes::Result<()> {
    let family: Family = opts.selection.shape.into();
    let collinearity: Collinearity = opts.selection.collinearity.into();

    store.create_folder_structure()?;

    let multi = MultiProgress::new();
    multi.println(format!(
        "Enumerating {} up to N = {}, collinear on the {}",
        family.title(),
        opts.max_n,
        collinearity.title()
    ))?;
    multi.println(format!(
        "Storing buckets in {}",
        store.config().root.display()
    ))?;

    let start = Instant::now();

    let levels = Generator::new(store, family, collinearity)
        .parallel(!opts.no_parallelism)
        .progress(multi.clone())
        .create_range(1, opts.max_n, opts.k_limit)?;

    let time = start.elapsed().as_micros();
    let max_n = levels.last().map_or(0, |level| level.n);

    let table = report::format_table(store, family, collinearity, max_n, opts.k_limit)?;
    println!();
    print!("{table}");
    println!();

    let totals = report::row_totals(store, family, collinearity, max_n, opts.k_limit)?;
    println!("{}", report::format_sequence(&totals));

    println!(
        "Took {}.{:06} s to enumerate up to N = {max_n}",
        time / 1_000_000,
        time % 1_000_000
    );

    Ok(())
}
