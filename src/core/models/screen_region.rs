use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegionName {
    Header,
    Footer,
    Logo,
}

impl fmt::Display for RegionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegionName::Header => write!(f, "header"),
            RegionName::Footer => write!(f, "footer"),
            RegionName::Logo => write!(f, "logo"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreenRegion {
    pub x_position: u32,
    pub y_position: u32,
    pub width: u32,
    pub height: u32,
}

impl ScreenRegion {
    pub fn from_rectangle((x_position, y_position, width, height): (u32, u32, u32, u32)) -> Self {
        Self {
            x_position,
            y_position,
            width,
            height,
        }
    }

    pub fn has_area(&self) -> bool {
        self.width > 0 && self.height > 0
    }

    pub fn lies_within(&self, bounds_width: u32, bounds_height: u32) -> bool {
        let right_edge = self.x_position as u64 + self.width as u64;
        let bottom_edge = self.y_position as u64 + self.height as u64;

        right_edge <= bounds_width as u64 && bottom_edge <= bounds_height as u64
    }
}

impl fmt::Display for ScreenRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}x{} at ({}, {})",
            self.width, self.height, self.x_position, self.y_position
        )
    }
}

/// A screen rectangle that is expected to look like its reference template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonitoredRegion {
    pub name: RegionName,
    pub region: ScreenRegion,
}

impl MonitoredRegion {
    pub fn new(name: RegionName, region: ScreenRegion) -> Self {
        Self { name, region }
    }
}
