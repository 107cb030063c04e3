//! Task lifecycle state machine: worker accept/reject resolution and the
//! OTP gate that moves an accepted task into progress.
//!
//! The transition functions are pure over the `Task` value and return typed
//! errors; callers apply the mutated task to storage as one atomic write
//! (row-locked transaction), so no partial roster state can persist.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::error::AppError;
use crate::models::task::{AssignmentStatus, ServiceOtp, Task, TaskStatus};

/// A worker's response to a broadcast task.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, EnumString, Display, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ResponseAction {
    Accept,
    Reject,
}

/// How a response collapsed into task-level state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseOutcome {
    /// The responder won the task; every other roster entry was rejected.
    Accepted,
    /// The responder bowed out; other workers may still act.
    RejectedStillOpen,
    /// The last pending worker rejected; the task escalated to rejected.
    RejectedByAll,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TransitionError {
    #[error("worker not assigned to this task")]
    NotAssigned,

    #[error("task is no longer open for responses")]
    TaskNotOpen,

    #[error("response already recorded for this worker")]
    AlreadyResponded,

    #[error("task must be accepted before requesting an otp")]
    NotAccepted,

    #[error("no otp has been requested for this task")]
    OtpNotRequested,

    #[error("otp already verified")]
    OtpAlreadyVerified,

    #[error("invalid otp")]
    OtpMismatch,
}

impl From<TransitionError> for AppError {
    fn from(err: TransitionError) -> Self {
        match err {
            TransitionError::NotAssigned => AppError::Unauthorized(err.to_string()),
            TransitionError::OtpAlreadyVerified => AppError::AlreadyDone(err.to_string()),
            TransitionError::OtpMismatch => AppError::Validation(err.to_string()),
            TransitionError::TaskNotOpen
            | TransitionError::AlreadyResponded
            | TransitionError::NotAccepted
            | TransitionError::OtpNotRequested => AppError::InvalidTransition(err.to_string()),
        }
    }
}

/// Resolve a worker's accept/reject against the roster.
///
/// Accept wins the task outright: the responder's entry becomes `accepted`
/// and every other entry is force-overwritten to `rejected`, which is what
/// enforces at-most-one-accepted rather than a precondition check. Reject
/// only escalates to a task-level rejection once the whole roster has
/// rejected.
///
/// The actor is located by prefix match of the supplied identifier against
/// roster entries (first match wins), tolerating identifier formatting
/// differences at the boundary.
pub fn apply_response(
    task: &mut Task,
    worker_id: &str,
    action: ResponseAction,
) -> Result<ResponseOutcome, TransitionError> {
    let idx = task
        .assigned_workers
        .iter()
        .position(|entry| entry.worker_id.starts_with(worker_id))
        .ok_or(TransitionError::NotAssigned)?;

    if task.status != TaskStatus::WaitingForApproval {
        return Err(TransitionError::TaskNotOpen);
    }
    if task.assigned_workers[idx].status != AssignmentStatus::Pending {
        return Err(TransitionError::AlreadyResponded);
    }

    match action {
        ResponseAction::Accept => {
            for (i, entry) in task.assigned_workers.iter_mut().enumerate() {
                entry.status = if i == idx {
                    AssignmentStatus::Accepted
                } else {
                    AssignmentStatus::Rejected
                };
            }
            task.status = TaskStatus::Accepted;
            task.is_approved = true;
            Ok(ResponseOutcome::Accepted)
        }
        ResponseAction::Reject => {
            task.assigned_workers[idx].status = AssignmentStatus::Rejected;

            let all_rejected = task
                .assigned_workers
                .iter()
                .all(|entry| entry.status == AssignmentStatus::Rejected);

            if all_rejected {
                task.status = TaskStatus::Rejected;
                task.is_rejected = true;
                Ok(ResponseOutcome::RejectedByAll)
            } else {
                Ok(ResponseOutcome::RejectedStillOpen)
            }
        }
    }
}

/// Arm the OTP gate with a freshly generated code.
///
/// Requires the task to be exactly in `accepted` state. Re-requesting while
/// still accepted issues a fresh code; service OTPs carry no expiry.
pub fn request_otp(task: &mut Task, code: String) -> Result<(), TransitionError> {
    if task.status != TaskStatus::Accepted {
        return Err(TransitionError::NotAccepted);
    }

    task.is_requested = true;
    task.service_otp = ServiceOtp {
        code: Some(code),
        verified: false,
    };
    Ok(())
}

/// Verify the customer-supplied code and move the task into progress.
/// A code verifies at most once.
pub fn verify_otp(task: &mut Task, submitted: &str) -> Result<(), TransitionError> {
    let code = task
        .service_otp
        .code
        .as_deref()
        .ok_or(TransitionError::OtpNotRequested)?;

    if task.service_otp.verified {
        return Err(TransitionError::OtpAlreadyVerified);
    }
    if code != submitted {
        return Err(TransitionError::OtpMismatch);
    }

    task.service_otp.verified = true;
    task.status = TaskStatus::InProgress;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    use crate::models::task::{Assignment, CartLine};

    fn broadcast_task(worker_ids: &[&str]) -> Task {
        Task {
            id: Uuid::new_v4(),
            order_id: "CL1234".to_string(),
            customer_name: "Asha".to_string(),
            phone: "9876543210".to_string(),
            email: None,
            address: "12 Lake Road".to_string(),
            pincode: "560001".to_string(),
            cart: vec![CartLine {
                name: "Deep Clean".to_string(),
                price: 500.0,
                quantity: 1,
                category: "cleaning".to_string(),
                earning: Some(100.0),
            }],
            subtotal: 500.0,
            discount: 0.0,
            total: 500.0,
            payment_method: "Pay After Service".to_string(),
            date: "2026-09-01".to_string(),
            time_slot: "10:00-12:00".to_string(),
            assigned_workers: worker_ids
                .iter()
                .map(|id| Assignment {
                    worker_id: id.to_string(),
                    status: AssignmentStatus::Pending,
                })
                .collect(),
            status: TaskStatus::WaitingForApproval,
            is_approved: false,
            is_rejected: false,
            is_completed: false,
            is_canceled: false,
            is_requested: false,
            service_otp: ServiceOtp::default(),
            created_at: Utc::now(),
        }
    }

    fn accepted_count(task: &Task) -> usize {
        task.assigned_workers
            .iter()
            .filter(|e| e.status == AssignmentStatus::Accepted)
            .count()
    }

    #[test]
    fn accept_wins_and_rejects_the_rest() {
        let mut task = broadcast_task(&["CL001", "CL002", "CL003"]);

        let outcome = apply_response(&mut task, "CL001", ResponseAction::Accept).unwrap();
        assert_eq!(outcome, ResponseOutcome::Accepted);
        assert_eq!(task.status, TaskStatus::Accepted);
        assert!(task.is_approved);
        assert_eq!(task.assigned_workers[0].status, AssignmentStatus::Accepted);
        assert_eq!(task.assigned_workers[1].status, AssignmentStatus::Rejected);
        assert_eq!(task.assigned_workers[2].status, AssignmentStatus::Rejected);
    }

    #[test]
    fn at_most_one_accepted_after_any_action_sequence() {
        // Exclusivity holds regardless of the interleaving of responses.
        let mut task = broadcast_task(&["CL001", "CL002", "CL003"]);
        let _ = apply_response(&mut task, "CL002", ResponseAction::Reject).unwrap();
        let _ = apply_response(&mut task, "CL003", ResponseAction::Accept).unwrap();
        assert_eq!(accepted_count(&task), 1);

        // A late accept from the remaining worker is refused, not merged.
        let err = apply_response(&mut task, "CL001", ResponseAction::Accept).unwrap_err();
        assert_eq!(err, TransitionError::TaskNotOpen);
        assert_eq!(accepted_count(&task), 1);
    }

    #[test]
    fn all_rejected_escalates_exactly_once() {
        let mut task = broadcast_task(&["CL001", "CL002"]);

        let first = apply_response(&mut task, "CL002", ResponseAction::Reject).unwrap();
        assert_eq!(first, ResponseOutcome::RejectedStillOpen);
        assert_eq!(task.status, TaskStatus::WaitingForApproval);
        assert!(!task.is_rejected);

        let second = apply_response(&mut task, "CL001", ResponseAction::Reject).unwrap();
        assert_eq!(second, ResponseOutcome::RejectedByAll);
        assert_eq!(task.status, TaskStatus::Rejected);
        assert!(task.is_rejected);

        // No further responses once the aggregate state is terminal.
        let err = apply_response(&mut task, "CL001", ResponseAction::Reject).unwrap_err();
        assert_eq!(err, TransitionError::TaskNotOpen);
    }

    #[test]
    fn rejection_order_does_not_matter() {
        for order in [["CL001", "CL002"], ["CL002", "CL001"]] {
            let mut task = broadcast_task(&["CL001", "CL002"]);
            let _ = apply_response(&mut task, order[0], ResponseAction::Reject).unwrap();
            let out = apply_response(&mut task, order[1], ResponseAction::Reject).unwrap();
            assert_eq!(out, ResponseOutcome::RejectedByAll);
            assert_eq!(task.status, TaskStatus::Rejected);
        }
    }

    #[test]
    fn unknown_worker_is_unauthorized() {
        let mut task = broadcast_task(&["CL001"]);
        let err = apply_response(&mut task, "MU001", ResponseAction::Accept).unwrap_err();
        assert_eq!(err, TransitionError::NotAssigned);
        assert_eq!(AppError::from(err).to_string(), "worker not assigned to this task");
    }

    #[test]
    fn actor_lookup_uses_prefix_match() {
        // Roster ids may carry formatting the caller's identifier lacks.
        let mut task = broadcast_task(&["CL001-north", "CL002"]);
        let outcome = apply_response(&mut task, "CL001", ResponseAction::Accept).unwrap();
        assert_eq!(outcome, ResponseOutcome::Accepted);
        assert_eq!(task.assigned_workers[0].status, AssignmentStatus::Accepted);
    }

    #[test]
    fn double_reject_from_same_worker_is_refused() {
        let mut task = broadcast_task(&["CL001", "CL002", "CL003"]);
        let _ = apply_response(&mut task, "CL001", ResponseAction::Reject).unwrap();
        let err = apply_response(&mut task, "CL001", ResponseAction::Reject).unwrap_err();
        assert_eq!(err, TransitionError::AlreadyResponded);
    }

    #[test]
    fn otp_requires_accepted_state() {
        let mut task = broadcast_task(&["CL001", "CL002"]);
        let err = request_otp(&mut task, "123456".to_string()).unwrap_err();
        assert_eq!(err, TransitionError::NotAccepted);

        let _ = apply_response(&mut task, "CL001", ResponseAction::Accept).unwrap();
        request_otp(&mut task, "123456".to_string()).unwrap();
        assert!(task.is_requested);
        assert_eq!(task.service_otp.code.as_deref(), Some("123456"));
        assert!(!task.service_otp.verified);
    }

    #[test]
    fn re_request_issues_a_fresh_code() {
        let mut task = broadcast_task(&["CL001"]);
        let _ = apply_response(&mut task, "CL001", ResponseAction::Accept).unwrap();
        request_otp(&mut task, "111111".to_string()).unwrap();
        request_otp(&mut task, "222222".to_string()).unwrap();
        assert_eq!(task.service_otp.code.as_deref(), Some("222222"));
    }

    #[test]
    fn wrong_code_leaves_state_unchanged() {
        let mut task = broadcast_task(&["CL001"]);
        let _ = apply_response(&mut task, "CL001", ResponseAction::Accept).unwrap();
        request_otp(&mut task, "123456".to_string()).unwrap();

        let err = verify_otp(&mut task, "654321").unwrap_err();
        assert_eq!(err, TransitionError::OtpMismatch);
        assert_eq!(task.status, TaskStatus::Accepted);
        assert!(!task.service_otp.verified);
    }

    #[test]
    fn correct_code_verifies_once_then_conflicts() {
        let mut task = broadcast_task(&["CL001"]);
        let _ = apply_response(&mut task, "CL001", ResponseAction::Accept).unwrap();
        request_otp(&mut task, "123456".to_string()).unwrap();

        verify_otp(&mut task, "123456").unwrap();
        assert_eq!(task.status, TaskStatus::InProgress);
        assert!(task.service_otp.verified);

        let err = verify_otp(&mut task, "123456").unwrap_err();
        assert_eq!(err, TransitionError::OtpAlreadyVerified);
        assert_eq!(task.status, TaskStatus::InProgress);
    }

    #[test]
    fn verify_without_request_is_invalid() {
        let mut task = broadcast_task(&["CL001"]);
        let err = verify_otp(&mut task, "123456").unwrap_err();
        assert_eq!(err, TransitionError::OtpNotRequested);
    }
}
