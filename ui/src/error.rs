use tabs::TabError;
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ShellError {
    #[error("Tab error: {0}")]
    Tab(#[from] TabError),
}
