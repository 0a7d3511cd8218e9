//! Sync adapters

pub mod hierarchy;

pub use hierarchy::DepartmentHierarchySync;
