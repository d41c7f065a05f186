//! Database entities (sea-orm models).
//!
//! One module per table. The scheduling calendar walks the chain
//! `order_stage_assignment -> order_stage -> order_detail -> order`;
//! the remaining tables support order intake and the conversion flow.

pub mod customer;
pub mod draft;
pub mod employee;
pub mod measurement;
pub mod order;
pub mod order_detail;
pub mod order_stage;
pub mod order_stage_assignment;
