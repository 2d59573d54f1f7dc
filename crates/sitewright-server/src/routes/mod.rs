pub mod compose;
pub mod deployments;
