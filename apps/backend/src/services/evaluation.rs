//! Evaluation queue and worker.
//!
//! Free-text answers are enriched in a second phase: a job keyed by answer id
//! is queued, a worker task calls the text evaluator outside any database
//! transaction, then patches only the answer's feedback. Callers either wait
//! for the outcome through a reply channel or fire and forget.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot, Semaphore};
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::db::Database;
use crate::error::{ApiError, Result};
use crate::services::evaluator::{EvaluatorError, TextEvaluator};

/// Timeout and retry policy applied to each evaluator call.
#[derive(Debug, Clone)]
pub struct EvaluationPolicy {
    pub timeout: Duration,
    /// Total attempts, including the first. 1 means no retry.
    pub max_attempts: u32,
    /// Evaluator calls allowed in flight at once.
    pub concurrency: usize,
}

impl Default for EvaluationPolicy {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            max_attempts: 1,
            concurrency: 4,
        }
    }
}

/// One pending evaluation.
#[derive(Debug)]
pub struct EvaluationJob {
    pub answer_id: Uuid,
    pub question: String,
    pub answer: String,
    reply: Option<oneshot::Sender<Result<String>>>,
}

/// Sending half of the evaluation queue, shared through application state.
#[derive(Clone)]
pub struct EvaluationQueue {
    sender: mpsc::Sender<EvaluationJob>,
}

impl EvaluationQueue {
    /// Create a bounded queue and the receiver the worker consumes.
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<EvaluationJob>) {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        (Self { sender }, receiver)
    }

    /// Queue a job and wait for the feedback it produced.
    pub async fn evaluate(&self, answer_id: Uuid, question: String, answer: String) -> Result<String> {
        let (reply, outcome) = oneshot::channel();
        let job = EvaluationJob {
            answer_id,
            question,
            answer,
            reply: Some(reply),
        };

        self.sender
            .send(job)
            .await
            .map_err(|_| ApiError::Internal("evaluation queue is closed".to_string()))?;

        tracing::debug!("Queued evaluation for answer {}", answer_id);

        outcome
            .await
            .map_err(|_| ApiError::Internal("evaluation worker dropped the job".to_string()))?
    }

    /// Queue a job without waiting. A full queue drops the job.
    pub fn enqueue(&self, answer_id: Uuid, question: String, answer: String) -> bool {
        let job = EvaluationJob {
            answer_id,
            question,
            answer,
            reply: None,
        };

        match self.sender.try_send(job) {
            Ok(()) => {
                tracing::debug!("Queued background evaluation for answer {}", answer_id);
                true
            }
            Err(e) => {
                tracing::warn!("Dropping evaluation for answer {}: {}", answer_id, e);
                false
            }
        }
    }
}

/// Call the evaluator under the policy's timeout, retrying failed attempts.
pub async fn call_with_policy<E: TextEvaluator>(
    evaluator: &E,
    policy: &EvaluationPolicy,
    question: &str,
    answer: &str,
) -> std::result::Result<String, EvaluatorError> {
    let attempts = policy.max_attempts.max(1);
    let mut attempt = 1;

    loop {
        let outcome = match tokio::time::timeout(policy.timeout, evaluator.evaluate(question, answer)).await {
            Ok(result) => result,
            Err(_) => Err(EvaluatorError::Timeout(policy.timeout)),
        };

        match outcome {
            Ok(feedback) => return Ok(feedback),
            Err(err) if attempt < attempts => {
                tracing::warn!("Evaluation attempt {}/{} failed: {}", attempt, attempts, err);
                attempt += 1;
            }
            Err(err) => return Err(err),
        }
    }
}

async fn process_job<E: TextEvaluator>(
    db: &Database,
    evaluator: &E,
    policy: &EvaluationPolicy,
    job: &EvaluationJob,
) -> Result<String> {
    let feedback = call_with_policy(evaluator, policy, &job.question, &job.answer)
        .await
        .map_err(|e| {
            tracing::warn!("Evaluation failed for answer {}: {}", job.answer_id, e);
            ApiError::Evaluation(e.to_string())
        })?;

    if db.update_feedback(job.answer_id, &feedback).await? {
        tracing::info!("Stored feedback for answer {}", job.answer_id);
    } else {
        tracing::warn!("Answer {} vanished before feedback was stored", job.answer_id);
    }

    Ok(feedback)
}

/// Spawn the worker that drains the queue until every sender is dropped.
pub fn spawn_worker<E: TextEvaluator>(
    db: Arc<Database>,
    evaluator: Arc<E>,
    policy: EvaluationPolicy,
    mut receiver: mpsc::Receiver<EvaluationJob>,
) -> JoinHandle<()> {
    let permits = Arc::new(Semaphore::new(policy.concurrency.max(1)));
    let policy = Arc::new(policy);

    tokio::spawn(async move {
        while let Some(mut job) = receiver.recv().await {
            let Ok(permit) = permits.clone().acquire_owned().await else {
                break;
            };
            let db = db.clone();
            let evaluator = evaluator.clone();
            let policy = policy.clone();

            tokio::spawn(async move {
                let outcome = process_job(&db, evaluator.as_ref(), &policy, &job).await;
                if let Some(reply) = job.reply.take() {
                    // The caller may have gone away; the feedback is stored regardless.
                    let _ = reply.send(outcome);
                }
                drop(permit);
            });
        }

        tracing::info!("Evaluation queue closed, worker exiting");
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Fails a fixed number of times, then succeeds.
    struct FlakyEvaluator {
        failures: u32,
        calls: AtomicU32,
    }

    impl FlakyEvaluator {
        fn new(failures: u32) -> Self {
            Self {
                failures,
                calls: AtomicU32::new(0),
            }
        }
    }

    impl TextEvaluator for FlakyEvaluator {
        async fn evaluate(&self, question: &str, _answer: &str) -> std::result::Result<String, EvaluatorError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            if call <= self.failures {
                Err(EvaluatorError::Backend {
                    status: 503,
                    message: "busy".to_string(),
                })
            } else {
                Ok(format!("Feedback on {question}"))
            }
        }
    }

    struct SlowEvaluator;

    impl TextEvaluator for SlowEvaluator {
        async fn evaluate(&self, _question: &str, _answer: &str) -> std::result::Result<String, EvaluatorError> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok("too late".to_string())
        }
    }

    fn policy(max_attempts: u32) -> EvaluationPolicy {
        EvaluationPolicy {
            timeout: Duration::from_millis(50),
            max_attempts,
            concurrency: 1,
        }
    }

    #[tokio::test]
    async fn test_default_policy_does_not_retry() {
        let evaluator = FlakyEvaluator::new(1);
        let result = call_with_policy(&evaluator, &EvaluationPolicy::default(), "Q", "A").await;

        assert!(matches!(result, Err(EvaluatorError::Backend { status: 503, .. })));
        assert_eq!(evaluator.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_retry_recovers_from_transient_failure() {
        let evaluator = FlakyEvaluator::new(2);
        let result = call_with_policy(&evaluator, &policy(3), "Q", "A").await;

        assert_eq!(result.unwrap(), "Feedback on Q");
        assert_eq!(evaluator.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_retry_gives_up_after_max_attempts() {
        let evaluator = FlakyEvaluator::new(5);
        let result = call_with_policy(&evaluator, &policy(2), "Q", "A").await;

        assert!(result.is_err());
        assert_eq!(evaluator.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_timeout_is_reported() {
        let result = call_with_policy(&SlowEvaluator, &policy(1), "Q", "A").await;
        assert!(matches!(result, Err(EvaluatorError::Timeout(_))));
    }

    #[tokio::test]
    async fn test_enqueue_on_full_queue_drops_job() {
        let (queue, _receiver) = EvaluationQueue::channel(1);

        assert!(queue.enqueue(Uuid::new_v4(), "Q".to_string(), "A".to_string()));
        assert!(!queue.enqueue(Uuid::new_v4(), "Q".to_string(), "A".to_string()));
    }

    #[tokio::test]
    async fn test_evaluate_on_closed_queue_fails() {
        let (queue, receiver) = EvaluationQueue::channel(1);
        drop(receiver);

        let result = queue
            .evaluate(Uuid::new_v4(), "Q".to_string(), "A".to_string())
            .await;
        assert!(matches!(result, Err(ApiError::Internal(_))));
    }
}
