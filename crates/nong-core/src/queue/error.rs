use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum QueueError {
    #[error("sequential queue is closed; task {task} was not run")]
    Closed { task: String },

    #[error("task {task} aborted before producing a result")]
    Aborted { task: String },
}
