use bucketsum::{Accumulator, Duration};
use std::sync::Arc;
use std::time::Instant;

fn main() -> bucketsum::Result<()> {
    env_logger::builder()
        .filter_module("bucketsum", log::LevelFilter::Debug)
        .filter_module("ingest", log::LevelFilter::Trace)
        .parse_default_env()
        .init();

    let acc = Arc::new(
        Accumulator::builder()
            .quantization(Duration::millis(100))
            .capacity(64)
            .build()?,
    );

    let from = bucketsum::timestamp();
    let start = Instant::now();

    let writers = ["w-0", "w-1", "w-2", "w-3"]
        .into_iter()
        .map(|writer| {
            let acc = acc.clone();

            std::thread::spawn(move || {
                use rand::Rng;

                let mut rng = rand::thread_rng();

                for idx in 0..200_000 {
                    acc.add_now(rng.gen_range(0..10));

                    if idx > 0 && idx % 50_000 == 0 {
                        log::info!("[{writer}] ingested {idx}");
                    }
                }
            })
        })
        .collect::<Vec<_>>();

    for writer in writers {
        if writer.join().is_err() {
            log::error!("writer panicked");
        }
    }

    let to = bucketsum::timestamp() + acc.quantization();

    log::info!("ingested in {:?}", start.elapsed());
    log::info!("buckets: {}", acc.len());
    log::info!("sum: {}", acc.sum(from, to)?);
    log::info!("avg per second: {}", acc.avg_per_second(from, to)?);
    log::info!("first/last: {:?}", acc.first_last());

    acc.pretty_print(true);

    Ok(())
}
