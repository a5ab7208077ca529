// THEORY:
// A single `StackSampler` is synchronous and not re-entrant. When many stacks
// need sampling (a bracketed burst per scene, a batch of calibration shots), the
// pool runs them side by side with one engine per worker, so no engine is ever
// shared between threads.
//
// Key architectural principles:
// 1.  **Dispatcher plus workers**: jobs enter one queue; a dispatcher task hands
//     them to workers round-robin, and each worker owns its own engine.
// 2.  **Blocking work off the async threads**: sampling is pure arithmetic, so
//     every job runs inside `spawn_blocking` and the engine travels into the
//     blocking closure and back.
// 3.  **Same policy as the engine**: a stack that cannot be sampled is not a pool
//     error. It comes back as a `SampleOutcome` whose result explains why.

use crate::config::SamplingConfig;
use crate::core_modules::exposure::{ExposureImage, ExposureStack};
use crate::error::{PoolError, SamplingError};
use crate::pipeline::{SampleBuffer, StackSampler};
use futures::future::join_all;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// One exposure stack to sample. Exposure order is the order of `exposures`.
#[derive(Debug, Clone)]
pub struct SampleJob<I> {
    pub job_id: u64,
    pub exposures: Vec<Arc<I>>,
}

/// The result of one job.
#[derive(Debug, Clone)]
pub struct SampleOutcome {
    pub job_id: u64,
    pub result: Result<SampleBuffer, SamplingError>,
}

impl SampleOutcome {
    /// Sample count of the produced buffer, 0 when the stack was not sampled.
    pub fn sample_count(&self) -> usize {
        self.result.as_ref().map_or(0, SampleBuffer::sample_count)
    }
}

struct PoolTask<I> {
    job: SampleJob<I>,
    reply: oneshot::Sender<SampleOutcome>,
}

pub struct SamplerPool<I> {
    task_sender: mpsc::UnboundedSender<PoolTask<I>>,
    dispatcher: JoinHandle<()>,
    workers: Vec<JoinHandle<()>>,
}

impl<I> SamplerPool<I>
where
    I: ExposureImage + Send + Sync + 'static,
{
    /// Starts the pool on the current tokio runtime. `workers` defaults to the
    /// number of logical CPUs.
    pub fn new(config: SamplingConfig, workers: Option<usize>) -> Self {
        let worker_count = workers.unwrap_or_else(num_cpus::get).max(1);
        let (task_sender, mut task_receiver) = mpsc::unbounded_channel::<PoolTask<I>>();

        let (worker_senders, worker_receivers): (Vec<_>, Vec<_>) = (0..worker_count)
            .map(|_| mpsc::unbounded_channel::<PoolTask<I>>())
            .unzip();

        let dispatcher = tokio::spawn(async move {
            let mut worker_idx = 0;
            while let Some(task) = task_receiver.recv().await {
                if worker_senders[worker_idx].send(task).is_err() {
                    warn!(worker = worker_idx, "sampler worker is gone, dropping job");
                }
                worker_idx = (worker_idx + 1) % worker_senders.len();
            }
        });

        let workers = worker_receivers
            .into_iter()
            .enumerate()
            .map(|(worker, mut receiver)| {
                let worker_config = config.clone();
                tokio::spawn(async move {
                    let mut engine = StackSampler::new();
                    while let Some(task) = receiver.recv().await {
                        let job_config = worker_config.clone();
                        let joined = tokio::task::spawn_blocking(move || {
                            let outcome = Self::run_job(&mut engine, &task.job, &job_config);
                            (engine, outcome, task.reply)
                        })
                        .await;

                        match joined {
                            Ok((returned, outcome, reply)) => {
                                engine = returned;
                                debug!(worker, job_id = outcome.job_id, samples = outcome.sample_count(), "job finished");
                                let _ = reply.send(outcome);
                            }
                            Err(err) => {
                                warn!(worker, %err, "sampling job panicked");
                                engine = StackSampler::new();
                            }
                        }
                    }
                })
            })
            .collect();

        info!(workers = worker_count, "sampler pool started");
        Self {
            task_sender,
            dispatcher,
            workers,
        }
    }

    fn run_job(engine: &mut StackSampler, job: &SampleJob<I>, config: &SamplingConfig) -> SampleOutcome {
        let stack: ExposureStack<'_, I> = job.exposures.iter().map(|img| &**img).collect();
        let result = engine
            .try_compute(&stack, config)
            .map(|()| engine.take_buffer().unwrap_or_else(|| SampleBuffer::new(0, 0, 0)));
        SampleOutcome {
            job_id: job.job_id,
            result,
        }
    }

    pub fn workers(&self) -> usize {
        self.workers.len()
    }

    /// Queues one job and waits for its outcome.
    pub async fn sample(&self, job: SampleJob<I>) -> Result<SampleOutcome, PoolError> {
        let job_id = job.job_id;
        let (reply, result) = oneshot::channel();
        self.task_sender
            .send(PoolTask { job, reply })
            .map_err(|_| PoolError::WorkerUnavailable)?;
        result.await.map_err(|_| PoolError::ResultDropped { job_id })
    }

    /// Queues every job at once and waits for all outcomes, in job order.
    pub async fn sample_all(&self, jobs: Vec<SampleJob<I>>) -> Vec<Result<SampleOutcome, PoolError>> {
        join_all(jobs.into_iter().map(|job| self.sample(job))).await
    }

    /// Closes the queue and waits for the dispatcher and every worker to exit.
    pub async fn shutdown(self) {
        drop(self.task_sender);
        let _ = self.dispatcher.await;
        for worker in self.workers {
            let _ = worker.await;
        }
        debug!("sampler pool stopped");
    }
}
