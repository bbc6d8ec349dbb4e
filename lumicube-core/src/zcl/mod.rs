//! ZCL application layer
//!
//! The attribute catalogue, typed values, attribute getters and setters,
//! and the command dispatcher.

pub mod attributes;
pub mod dispatcher;
pub mod registry;
pub mod value;

pub use attributes::{
    lookup, Access, Attribute, AttributeDef, ATTRIBUTES, CLUSTER_BASIC, CLUSTER_CUBE,
    CLUSTER_TIME, ZIGBEE_TIME_OFFSET,
};
pub use dispatcher::DispatchOutcome;
pub use value::AttributeValue;
