use serde::{Deserialize, Serialize};

/// People per hour a segment can move.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Capacity {
    pub average: u64,
    pub potential: u64,
}

pub const NO_CAPACITY: Capacity = Capacity {
    average: 0,
    potential: 0,
};

const CAPACITIES: &[(&str, Capacity)] = &[
    ("sidewalk", Capacity { average: 19_000, potential: 19_000 }),
    ("drive-lane", Capacity { average: 1_500, potential: 2_000 }),
    ("bike-lane", Capacity { average: 14_000, potential: 14_000 }),
    ("scooter", Capacity { average: 14_000, potential: 14_000 }),
    ("light-rail", Capacity { average: 18_000, potential: 20_000 }),
    ("streetcar", Capacity { average: 18_000, potential: 20_000 }),
    ("bus-lane", Capacity { average: 5_000, potential: 8_000 }),
];

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Segment {
    #[serde(rename = "type")]
    pub segment_type: String,
    #[serde(rename = "variantString", default)]
    pub variant_string: String,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct SegmentCapacity {
    pub label: String,
    pub capacity: Capacity,
    pub segment: Segment,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StreetCapacity {
    pub segment_data: Vec<SegmentCapacity>,
    pub average_total: u64,
    pub potential_total: u64,
}

/// Capacity for a segment type; unknown types carry none.
pub fn get_capacity(segment_type: &str) -> Capacity {
    CAPACITIES
        .iter()
        .find(|(name, _)| *name == segment_type)
        .map(|(_, capacity)| *capacity)
        .unwrap_or(NO_CAPACITY)
}

pub fn get_segment_capacity(segment: &Segment) -> SegmentCapacity {
    SegmentCapacity {
        label: format!("{} {}", segment.variant_string, segment.segment_type),
        capacity: get_capacity(&segment.segment_type),
        segment: segment.clone(),
    }
}

pub fn get_street_capacity(segments: &[Segment]) -> StreetCapacity {
    let segment_data: Vec<SegmentCapacity> = segments.iter().map(get_segment_capacity).collect();
    let average_total = segment_data.iter().map(|s| s.capacity.average).sum();
    let potential_total = segment_data.iter().map(|s| s.capacity.potential).sum();

    StreetCapacity {
        segment_data,
        average_total,
        potential_total,
    }
}
