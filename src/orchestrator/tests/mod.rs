use super::test_helpers::{
    ScriptedProcessor, create_test_orchestrator, create_test_orchestrator_with_config,
    drain_events, pdf, progress_sequence,
};
use crate::config::Config;
use crate::error::{AdmissionError, Error, PreconditionError};
use crate::notifier::Severity;
use crate::types::{Event, FileRef, RemoteState, Status};

mod batch;
