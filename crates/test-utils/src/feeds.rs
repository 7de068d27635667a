//! Builders for complete synthetic feeds.

use crate::generators::{
    assemble_message, bitmap_section, data_section, encode_runlength, grid_section,
    guidance_product_section, identification_section, local_use_section,
    representation_section, saturation_product_section, FeedGrid,
};

/// Reference time written into section 1.
#[derive(Debug, Clone, Copy)]
struct ReferenceTime {
    year: u16,
    month: u8,
    day: u8,
    hour: u8,
    minute: u8,
}

impl Default for ReferenceTime {
    fn default() -> Self {
        Self {
            year: 2023,
            month: 6,
            day: 2,
            hour: 0,
            minute: 0,
        }
    }
}

#[derive(Debug, Clone)]
struct Dataset {
    product: Vec<u8>,
    values: Vec<i32>,
}

#[derive(Debug, Clone)]
struct MessageParts {
    time: ReferenceTime,
    grid: FeedGrid,
    bit_num: u8,
    level_num_padding: u16,
    local_use: bool,
    bitmap: bool,
    datasets: Vec<Dataset>,
}

impl MessageParts {
    fn new(grid: FeedGrid) -> Self {
        Self {
            time: ReferenceTime::default(),
            grid,
            bit_num: 8,
            level_num_padding: 0,
            local_use: false,
            bitmap: true,
            datasets: Vec::new(),
        }
    }

    fn build(&self) -> Vec<u8> {
        let t = self.time;
        let mut sections = vec![identification_section(t.year, t.month, t.day, t.hour, t.minute)];
        if self.local_use {
            sections.push(local_use_section());
        }
        sections.push(grid_section(&self.grid));

        for dataset in &self.datasets {
            let mut encoded = encode_runlength(&dataset.values, self.bit_num);
            if self.level_num_padding > 0 {
                let level_num = encoded.level_max() + self.level_num_padding;
                encoded = encoded.with_level_num(level_num);
            }
            sections.push(dataset.product.clone());
            sections.push(representation_section(&encoded, self.grid.grid_num()));
            if self.bitmap {
                sections.push(bitmap_section());
            }
            sections.push(data_section(&encoded.payload));
        }

        assemble_message(&sections)
    }
}

/// Build a soil-water-index feed.
///
/// Datasets are written in the order they are added.
///
/// ```ignore
/// let grid = FeedGrid::new(4, 3, 36_000_000, 135_000_000, 1_000_000, 1_000_000);
/// let bytes = SaturationFeedBuilder::new(grid)
///     .with_constant(853, 120, 205)
///     .build();
/// ```
#[derive(Debug, Clone)]
pub struct SaturationFeedBuilder {
    parts: MessageParts,
}

impl SaturationFeedBuilder {
    pub fn new(grid: FeedGrid) -> Self {
        Self {
            parts: MessageParts::new(grid),
        }
    }

    pub fn with_reference_time(mut self, year: u16, month: u8, day: u8, hour: u8) -> Self {
        self.parts.time = ReferenceTime {
            year,
            month,
            day,
            hour,
            minute: 0,
        };
        self
    }

    pub fn with_bit_num(mut self, bit_num: u8) -> Self {
        self.parts.bit_num = bit_num;
        self
    }

    /// Declare `extra` unused slots after each dataset's level table.
    pub fn with_unused_levels(mut self, extra: u16) -> Self {
        self.parts.level_num_padding = extra;
        self
    }

    pub fn with_local_use_section(mut self) -> Self {
        self.parts.local_use = true;
        self
    }

    pub fn without_bitmap_section(mut self) -> Self {
        self.parts.bitmap = false;
        self
    }

    /// Append a dataset with an arbitrary product type.
    pub fn with_dataset(mut self, data_type: u8, subtype: u32, values: Vec<i32>) -> Self {
        self.parts.datasets.push(Dataset {
            product: saturation_product_section(data_type, subtype),
            values,
        });
        self
    }

    pub fn with_total(self, values: Vec<i32>) -> Self {
        self.with_dataset(200, 0, values)
    }

    pub fn with_first_tank(self, values: Vec<i32>) -> Self {
        self.with_dataset(201, 1, values)
    }

    pub fn with_second_tank(self, values: Vec<i32>) -> Self {
        self.with_dataset(201, 2, values)
    }

    /// All three datasets, each constant over the grid.
    pub fn with_constant(self, total: i32, first: i32, second: i32) -> Self {
        let grid = self.parts.grid;
        self.with_total(grid.constant(total))
            .with_first_tank(grid.constant(first))
            .with_second_tank(grid.constant(second))
    }

    pub fn build(&self) -> Vec<u8> {
        self.parts.build()
    }
}

/// Build a rainfall guidance feed.
#[derive(Debug, Clone)]
pub struct GuidanceFeedBuilder {
    parts: MessageParts,
}

impl GuidanceFeedBuilder {
    pub fn new(grid: FeedGrid) -> Self {
        Self {
            parts: MessageParts::new(grid),
        }
    }

    pub fn with_reference_time(mut self, year: u16, month: u8, day: u8, hour: u8) -> Self {
        self.parts.time = ReferenceTime {
            year,
            month,
            day,
            hour,
            minute: 0,
        };
        self
    }

    pub fn with_bit_num(mut self, bit_num: u8) -> Self {
        self.parts.bit_num = bit_num;
        self
    }

    /// Append one dataset whose forecast hour is `ft` at span `span`.
    pub fn with_dataset(mut self, ft: u32, span: u32, values: Vec<i32>) -> Self {
        self.parts.datasets.push(Dataset {
            product: guidance_product_section(ft - span, span),
            values,
        });
        self
    }

    /// Append a cycle of datasets at `span`, forecast hours
    /// `span, 2*span, ..., last_ft`.
    pub fn with_cycle<F>(mut self, span: u32, last_ft: u32, mut rain: F) -> Self
    where
        F: FnMut(u32) -> Vec<i32>,
    {
        for ft in (span..=last_ft).step_by(span as usize) {
            self = self.with_dataset(ft, span, rain(ft));
        }
        self
    }

    /// The layout of a real guidance feed: an hourly cycle up to 6 h, the
    /// full 3-hourly cycle up to 78 h, then a later 3-hourly cycle up to 15 h
    /// that must be ignored.
    ///
    /// `rain(cycle, ft)` supplies each dataset's values.
    pub fn with_standard_cycles<F>(self, mut rain: F) -> Self
    where
        F: FnMut(u32, u32) -> Vec<i32>,
    {
        let builder = self.with_cycle(1, 6, |ft| rain(1, ft));
        let builder = builder.with_cycle(3, 78, |ft| rain(2, ft));
        builder.with_cycle(3, 15, |ft| rain(3, ft))
    }

    pub fn build(&self) -> Vec<u8> {
        self.parts.build()
    }
}
