//! Display transform capability consumed by the tracker.

use core::fmt::Debug;

use crate::orientation::Orientation;

/// Query and set the transform of the attached display
pub trait DisplayAdapter {
    /// Error raised by a failed query or apply
    type Error: Debug;

    /// Orientation the display currently shows
    fn current_transform(&mut self) -> Result<Orientation, Self::Error>;

    /// Rotate the display to match `orientation`
    fn apply_transform(&mut self, orientation: Orientation) -> Result<(), Self::Error>;
}

impl<T: DisplayAdapter + ?Sized> DisplayAdapter for &mut T {
    type Error = T::Error;

    fn current_transform(&mut self) -> Result<Orientation, Self::Error> {
        (**self).current_transform()
    }

    fn apply_transform(&mut self, orientation: Orientation) -> Result<(), Self::Error> {
        (**self).apply_transform(orientation)
    }
}

/// Display transform, counter-clockwise quarter turns
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Transform {
    /// No rotation
    Normal,
    /// 90° counter-clockwise
    Rotate90,
    /// 180°
    Rotate180,
    /// 270° counter-clockwise
    Rotate270,
}

impl Transform {
    /// Name understood by `xrandr --rotate`
    pub fn xrandr_name(self) -> &'static str {
        match self {
            Transform::Normal => "normal",
            Transform::Rotate90 => "left",
            Transform::Rotate180 => "inverted",
            Transform::Rotate270 => "right",
        }
    }

    /// Inverse of [`Transform::xrandr_name`]
    pub fn from_xrandr_name(name: &str) -> Option<Self> {
        match name {
            "normal" => Some(Transform::Normal),
            "left" => Some(Transform::Rotate90),
            "inverted" => Some(Transform::Rotate180),
            "right" => Some(Transform::Rotate270),
            _ => None,
        }
    }

    /// Name understood by `wlr-randr --transform`
    pub fn wlr_name(self) -> &'static str {
        match self {
            Transform::Normal => "normal",
            Transform::Rotate90 => "90",
            Transform::Rotate180 => "180",
            Transform::Rotate270 => "270",
        }
    }

    /// Inverse of [`Transform::wlr_name`]
    pub fn from_wlr_name(name: &str) -> Option<Self> {
        match name {
            "normal" => Some(Transform::Normal),
            "90" => Some(Transform::Rotate90),
            "180" => Some(Transform::Rotate180),
            "270" => Some(Transform::Rotate270),
            _ => None,
        }
    }
}

impl From<Orientation> for Transform {
    fn from(orientation: Orientation) -> Self {
        match orientation {
            Orientation::LandscapeRight => Transform::Normal,
            Orientation::PortraitDown => Transform::Rotate90,
            Orientation::LandscapeLeft => Transform::Rotate180,
            Orientation::PortraitUp => Transform::Rotate270,
        }
    }
}

impl From<Transform> for Orientation {
    fn from(transform: Transform) -> Self {
        match transform {
            Transform::Normal => Orientation::LandscapeRight,
            Transform::Rotate90 => Orientation::PortraitDown,
            Transform::Rotate180 => Orientation::LandscapeLeft,
            Transform::Rotate270 => Orientation::PortraitUp,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn orientation_bijection() {
        for o in Orientation::ALL {
            assert_eq!(Orientation::from(Transform::from(o)), o);
        }
        let mut seen = [false; 4];
        for o in Orientation::ALL {
            let idx = match Transform::from(o) {
                Transform::Normal => 0,
                Transform::Rotate90 => 1,
                Transform::Rotate180 => 2,
                Transform::Rotate270 => 3,
            };
            assert!(!seen[idx]);
            seen[idx] = true;
        }
    }

    #[test]
    fn names_invert() {
        for o in Orientation::ALL {
            let t = Transform::from(o);
            assert_eq!(Transform::from_xrandr_name(t.xrandr_name()), Some(t));
            assert_eq!(Transform::from_wlr_name(t.wlr_name()), Some(t));
        }
        assert_eq!(Transform::from_xrandr_name("90"), None);
        assert_eq!(Transform::from_wlr_name("left"), None);
    }

    #[test]
    fn portrait_up_rotates_right() {
        assert_eq!(
            Transform::from(Orientation::PortraitUp).xrandr_name(),
            "right"
        );
    }
}
