//! Traffic-capacity estimates derived from a street's segment list.

pub mod capacity;

pub use capacity::{
    get_capacity, get_segment_capacity, get_street_capacity, Capacity, Segment, SegmentCapacity,
    StreetCapacity, NO_CAPACITY,
};
