use std::fmt;

use serde::{Deserialize, Serialize};

/// Physical zone a lamp belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Group {
    /// Lamps along the left wall
    #[serde(alias = "left", alias = "Left")]
    WallLeft,
    /// Lamps along the middle row
    #[serde(alias = "middle", alias = "Middle")]
    WallMiddle,
    /// Lamps next to the windows
    #[serde(alias = "right", alias = "Right")]
    Window,
}

impl Group {
    pub const ALL: [Group; 3] = [Group::WallLeft, Group::WallMiddle, Group::Window];

    /// Short column label used by the dashboard grid.
    pub fn short_label(&self) -> &'static str {
        match self {
            Group::WallLeft => "L",
            Group::WallMiddle => "M",
            Group::Window => "R",
        }
    }
}

impl fmt::Display for Group {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Group::WallLeft => write!(f, "wallLeft"),
            Group::WallMiddle => write!(f, "wallMiddle"),
            Group::Window => write!(f, "window"),
        }
    }
}

/// One value per physical group.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct GroupLevels<T> {
    /// Level for the left wall group
    #[serde(rename = "levelL")]
    pub wall_left: T,
    /// Level for the middle group
    #[serde(rename = "levelM")]
    pub wall_middle: T,
    /// Level for the window group
    #[serde(rename = "levelW")]
    pub window: T,
}

impl<T> GroupLevels<T> {
    pub fn new(wall_left: T, wall_middle: T, window: T) -> Self {
        Self {
            wall_left,
            wall_middle,
            window,
        }
    }

    pub fn get(&self, group: Group) -> &T {
        match group {
            Group::WallLeft => &self.wall_left,
            Group::WallMiddle => &self.wall_middle,
            Group::Window => &self.window,
        }
    }

    pub fn map<U, F: FnMut(T) -> U>(self, mut f: F) -> GroupLevels<U> {
        GroupLevels {
            wall_left: f(self.wall_left),
            wall_middle: f(self.wall_middle),
            window: f(self.window),
        }
    }
}

impl<T: Clone> GroupLevels<T> {
    pub fn uniform(value: T) -> Self {
        Self::new(value.clone(), value.clone(), value)
    }
}
