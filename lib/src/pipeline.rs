use crate::error::Result;
use crate::generator::{Channel, Generator, Line};
use crate::plane::Plane;
use crate::settings::Settings;
use log::{debug, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::mpsc::{self, Receiver, SyncSender};
use std::thread;

/// Work for one generator thread.
#[derive(Clone, Debug)]
pub struct Job {
    pub plane: Plane,
    pub channel: Channel,
    pub budget: usize,
}

impl Job {
    pub fn new(plane: Plane, channel: Channel, budget: usize) -> Self {
        Self {
            plane,
            channel,
            budget,
        }
    }
}

/// Share of the line budget per channel, relative to the channel with the
/// highest ink demand, which gets 1.0.
pub fn channel_ratios(demands: [u64; 3]) -> [f64; 3] {
    let max = demands.iter().copied().max().unwrap_or(0);

    if max == 0 {
        return [0.0; 3];
    }

    demands.map(|demand| demand as f64 / max as f64)
}

pub fn allocate(requested: usize, demands: [u64; 3]) -> [usize; 3] {
    channel_ratios(demands).map(|ratio| (requested as f64 * ratio).floor() as usize)
}

/// One job per color component, with budgets proportional to how much ink
/// each component asks for.
pub fn color_jobs(planes: [Plane; 3], requested: usize) -> Vec<Job> {
    let demands = [0, 1, 2].map(|i| planes[i].ink_demand());
    let budgets = allocate(requested, demands);

    if budgets.iter().all(|&budget| budget == 0) {
        warn!("Image has no ink to draw");
    }

    planes
        .into_iter()
        .zip(Channel::RGB)
        .zip(budgets)
        .map(|((plane, channel), budget)| {
            debug!("{channel:?} demand {} gets {budget} lines", plane.ink_demand());
            Job::new(plane, channel, budget)
        })
        .collect()
}

pub fn seeded_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

fn produce(job: Job, settings: &Settings, rng: StdRng, tx: SyncSender<Result<Line>>) {
    let Job {
        plane,
        channel,
        budget,
    } = job;

    debug!("{channel:?} generator started with {budget} lines");

    for line in Generator::new(plane, channel, budget, settings, rng) {
        if tx.send(line).is_err() {
            debug!("{channel:?} generator stopped, nobody is listening");
            return;
        }
    }

    debug!("{channel:?} generator finished");
}

fn receive<F>(rx: Receiver<Result<Line>>, expected: usize, consume: &mut F) -> Result<usize>
where
    F: FnMut(Line) -> Result<()>,
{
    let mut received = 0;

    while received < expected {
        let Ok(line) = rx.recv() else {
            warn!("Generators stopped after {received} of {expected} lines");
            break;
        };

        consume(line?)?;
        received += 1;
    }

    Ok(received)
}

/// Runs every job on its own thread and hands their lines to `consume` on
/// the calling thread, in arrival order.
///
/// Lines of one job arrive in the order they were generated; lines of
/// different jobs interleave arbitrarily. The first error, from a generator
/// or from `consume`, ends the run: the queue is dropped so the remaining
/// generators stop at their next line. Returns the number of lines consumed.
pub fn run<F>(jobs: Vec<Job>, settings: &Settings, mut consume: F) -> Result<usize>
where
    F: FnMut(Line) -> Result<()>,
{
    let expected = jobs.iter().map(|job| job.budget).sum();
    let mut master = seeded_rng(settings.seed);

    thread::scope(|scope| {
        let (tx, rx) = mpsc::sync_channel(settings.queue_capacity);

        let workers = jobs
            .into_iter()
            .map(|job| {
                let tx = tx.clone();
                let rng = StdRng::seed_from_u64(master.gen());
                scope.spawn(move || produce(job, settings, rng, tx))
            })
            .collect::<Vec<_>>();

        drop(tx);

        let outcome = receive(rx, expected, &mut consume);

        for worker in workers {
            if let Err(panic) = worker.join() {
                std::panic::resume_unwind(panic);
            }
        }

        outcome
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use std::collections::HashMap;

    fn settings(seed: u64) -> Settings {
        Settings {
            trials: 6,
            weight: 40,
            seed: Some(seed),
            queue_capacity: 4,
            ..Default::default()
        }
    }

    fn gradient(width: u32, height: u32, offset: u32) -> Plane {
        let data = (0..width * height)
            .map(|i| ((i * 13 + offset) % 256) as u8)
            .collect();
        Plane::new(width, height, data).unwrap()
    }

    #[test]
    fn ratios_are_relative_to_the_highest_demand() {
        assert_eq!(channel_ratios([400, 300, 100]), [1.0, 0.75, 0.25]);
        assert_eq!(channel_ratios([100, 400, 200]), [0.25, 1.0, 0.5]);
        assert_eq!(channel_ratios([50, 50, 200]), [0.25, 0.25, 1.0]);
        assert_eq!(channel_ratios([0, 0, 0]), [0.0, 0.0, 0.0]);
    }

    #[test]
    fn budgets_are_floored() {
        assert_eq!(allocate(10, [300, 200, 100]), [10, 6, 3]);
        assert_eq!(allocate(0, [300, 200, 100]), [0, 0, 0]);

        for (i, budget) in allocate(777, [91, 37, 5]).into_iter().enumerate() {
            assert!(budget as f64 <= 777.0 * channel_ratios([91, 37, 5])[i]);
        }
    }

    #[test]
    fn color_jobs_follow_the_demand() {
        let white = Plane::filled(4, 4, 255);
        let dark = Plane::filled(4, 4, 0);
        let half = Plane::filled(4, 4, 255 - 128);

        let jobs = color_jobs([white, dark, half], 100);
        let budgets = jobs.iter().map(|job| (job.channel, job.budget)).collect::<Vec<_>>();

        assert_eq!(
            budgets,
            vec![
                (Channel::Red, 0),
                (Channel::Green, 100),
                (Channel::Blue, 50)
            ]
        );
    }

    #[test]
    fn consumes_every_budgeted_line() {
        let jobs = vec![
            Job::new(gradient(16, 12, 0), Channel::Red, 9),
            Job::new(gradient(16, 12, 5), Channel::Green, 4),
            Job::new(gradient(16, 12, 9), Channel::Blue, 0),
        ];

        let mut counts = HashMap::new();
        let total = run(jobs, &settings(1), |line| {
            *counts.entry(line.channel).or_insert(0) += 1;
            Ok(())
        })
        .unwrap();

        assert_eq!(total, 13);
        assert_eq!(counts.get(&Channel::Red), Some(&9));
        assert_eq!(counts.get(&Channel::Green), Some(&4));
        assert_eq!(counts.get(&Channel::Blue), None);
    }

    #[test]
    fn seeded_runs_repeat_per_channel() {
        let collect = || {
            let jobs = vec![
                Job::new(gradient(20, 20, 1), Channel::Red, 6),
                Job::new(gradient(20, 20, 2), Channel::Green, 6),
                Job::new(gradient(20, 20, 3), Channel::Blue, 6),
            ];
            let mut lines: HashMap<Channel, Vec<Line>> = HashMap::new();

            run(jobs, &settings(42), |line| {
                lines.entry(line.channel).or_default().push(line);
                Ok(())
            })
            .unwrap();

            lines
        };

        assert_eq!(collect(), collect());
    }

    #[test]
    fn consumer_errors_stop_the_run() {
        let jobs = vec![
            Job::new(gradient(32, 32, 0), Channel::Red, 10_000),
            Job::new(gradient(32, 32, 1), Channel::Green, 10_000),
        ];

        let mut seen = 0;
        let result = run(jobs, &settings(3), |_| {
            seen += 1;

            if seen == 3 {
                return Err(Error::frame("stop"));
            }

            Ok(())
        });

        assert!(matches!(result, Err(Error::Frame(_))));
        assert_eq!(seen, 3);
    }

    #[test]
    fn generator_errors_are_forwarded() {
        let jobs = vec![
            Job::new(Plane::filled(0, 0, 0), Channel::Red, 5),
            Job::new(gradient(8, 8, 0), Channel::Green, 5),
        ];

        let result = run(jobs, &settings(4), |_| Ok(()));

        assert!(matches!(result, Err(Error::Plane(_))));
    }
}
