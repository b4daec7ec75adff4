//! Integration tests: both engines driven against an in-memory backend.

mod mock_backend;
mod slip_flow;
mod chart_flow;
