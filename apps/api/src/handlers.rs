pub mod access;
pub mod approvals;
pub mod audit;
pub mod health;
pub mod webhook;
