use bucketsum::{Accumulator, Duration, Value};
use rand::Rng;
use std::collections::BTreeMap;
use std::sync::Arc;

const THREADS: usize = 8;
const WRITES_PER_THREAD: usize = 10_000;

#[test_log::test]
fn concurrent_adds_lose_no_updates() -> bucketsum::Result<()> {
    let quantization = Duration::millis(10);
    let acc = Arc::new(Accumulator::new(quantization)?);

    let handles = (0..THREADS)
        .map(|thread| {
            let acc = acc.clone();

            std::thread::spawn(move || {
                let mut rng = rand::thread_rng();
                let mut expected: BTreeMap<i64, Value> = BTreeMap::new();

                for _ in 0..WRITES_PER_THREAD {
                    // Half of the writes hit shared buckets, the other half a bucket range
                    // only this thread writes to
                    let ts = if rng.gen_bool(0.5) {
                        rng.gen_range(0..Duration::seconds(1))
                    } else {
                        Duration::seconds(10 + thread as i64) + rng.gen_range(0..quantization * 5)
                    };
                    let value = rng.gen_range(-100..=100);

                    acc.add(ts, value);
                    *expected.entry(acc.round_down(ts)).or_default() += value;
                }

                expected
            })
        })
        .collect::<Vec<_>>();

    let mut expected: BTreeMap<i64, Value> = BTreeMap::new();

    for handle in handles {
        for (key, value) in handle.join().expect("writer should not panic") {
            *expected.entry(key).or_default() += value;
        }
    }

    let from = 0;
    let to = Duration::seconds(10 + THREADS as i64 + 1);

    assert_eq!(expected, acc.interval_map(from, to));
    assert_eq!(expected.values().sum::<Value>(), acc.sum(from, to)?);
    assert_eq!(expected.len(), acc.len());

    Ok(())
}

#[test_log::test]
fn readers_run_alongside_writers() -> bucketsum::Result<()> {
    let quantization = Duration::millis(1);
    let acc = Accumulator::new(quantization)?;
    let buckets = 64;

    std::thread::scope(|scope| {
        for _ in 0..4 {
            scope.spawn(|| {
                for idx in 0..buckets {
                    acc.add(idx * quantization, 1);
                }
            });
        }

        for _ in 0..4 {
            scope.spawn(|| {
                for _ in 0..100 {
                    let slice = acc.interval_slice(0, buckets * quantization);
                    assert_eq!(64, slice.len());
                    assert!(slice.iter().all(|&x| (0..=4).contains(&x)));
                }
            });
        }
    });

    assert_eq!(4 * buckets, acc.sum(0, buckets * quantization)?);
    assert_eq!(
        vec![4; 64],
        acc.interval_slice(0, buckets * quantization)
    );

    Ok(())
}

#[test_log::test]
fn clear_while_writing() -> bucketsum::Result<()> {
    let acc = Accumulator::new(1)?;

    std::thread::scope(|scope| {
        scope.spawn(|| {
            for idx in 0..1_000 {
                acc.add(idx, 1);
            }
        });

        scope.spawn(|| {
            for _ in 0..100 {
                acc.clear_interval(0, 500);
            }
        });
    });

    acc.clear_interval(0, 500);

    assert_eq!(0, acc.sum(0, 500)?);
    assert_eq!(500, acc.sum(500, 1_000)?);
    assert_eq!(Some((500, 999)), acc.first_last());

    Ok(())
}
