//! Waste containers and their fill status.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::{CoordinateError, GeoPoint};

/// Fill status of a container.
///
/// Status transitions are driven by whoever owns the container records; the
/// planner only reads them. Only [`ContainerStatus::Ready`] and
/// [`ContainerStatus::Filled`] containers are worth a truck's visit.
///
/// # Examples
/// ```
/// use kerbside_core::ContainerStatus;
///
/// assert_eq!(ContainerStatus::Filling.as_str(), "filling");
/// assert_eq!("filled".parse::<ContainerStatus>(), Ok(ContainerStatus::Filled));
/// assert!(ContainerStatus::Ready.is_collectable());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum ContainerStatus {
    /// Nothing to collect.
    Empty,
    /// Partially filled; not yet worth a visit.
    Filling,
    /// Ready for collection.
    #[default]
    Ready,
    /// Full and overdue for collection.
    Filled,
}

impl ContainerStatus {
    /// Every status, in lifecycle order.
    pub const ALL: [Self; 4] = [Self::Empty, Self::Filling, Self::Ready, Self::Filled];

    /// Return the status as a lowercase `&str`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Empty => "empty",
            Self::Filling => "filling",
            Self::Ready => "ready",
            Self::Filled => "filled",
        }
    }

    /// Return `true` when a container in this status should be collected.
    #[must_use]
    pub const fn is_collectable(self) -> bool {
        matches!(self, Self::Ready | Self::Filled)
    }
}

impl fmt::Display for ContainerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown [`ContainerStatus`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown container status '{0}'")]
pub struct ParseStatusError(pub String);

impl FromStr for ContainerStatus {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParseStatusError(s.to_owned()))
    }
}

/// A physical waste-collection bin.
///
/// # Examples
/// ```
/// use kerbside_core::{Container, ContainerStatus, GeoPoint};
///
/// let location = GeoPoint::new(11.53855, -72.91672).unwrap();
/// let container = Container::new(2, location, 4000.25, ContainerStatus::Filling).unwrap();
/// assert_eq!(container.load(), 0.0);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Container {
    /// Externally assigned identifier.
    pub id: u64,
    /// Where the container stands.
    pub location: GeoPoint,
    /// Capacity of the container, in the same unit as truck capacity.
    pub volume: f64,
    /// Current fill status.
    #[cfg_attr(feature = "serde", serde(default))]
    pub status: ContainerStatus,
}

/// Errors returned by [`Container::new`] and [`Container::validate`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ContainerError {
    /// The location was not a valid WGS84 coordinate.
    #[error(transparent)]
    InvalidCoordinate(#[from] CoordinateError),
    /// Volume was negative or not finite.
    #[error("container {id} has invalid volume {volume}; expected a finite value >= 0")]
    InvalidVolume {
        /// Container identifier.
        id: u64,
        /// Offending volume.
        volume: f64,
    },
}

impl Container {
    /// Validate and construct a [`Container`].
    pub fn new(
        id: u64,
        location: GeoPoint,
        volume: f64,
        status: ContainerStatus,
    ) -> Result<Self, ContainerError> {
        let container = Self {
            id,
            location,
            volume,
            status,
        };
        container.validate()?;
        Ok(container)
    }

    /// Check location and volume of an already-built container.
    pub fn validate(&self) -> Result<(), ContainerError> {
        self.location.validate()?;
        if !self.volume.is_finite() || self.volume < 0.0 {
            return Err(ContainerError::InvalidVolume {
                id: self.id,
                volume: self.volume,
            });
        }
        Ok(())
    }

    /// Return `true` when the container should be visited.
    #[must_use]
    pub const fn is_collectable(&self) -> bool {
        self.status.is_collectable()
    }

    /// Volume this container contributes to a truck's capacity usage.
    ///
    /// Containers that are not collectable carry no load.
    #[must_use]
    pub const fn load(&self) -> f64 {
        if self.is_collectable() {
            self.volume
        } else {
            0.0
        }
    }
}

/// Order-independent sum of container loads.
///
/// Loads are kept sorted and summed smallest first, so the same set of
/// containers always yields the same total whatever order they are visited
/// in. Capacity checks and [`Route::load`](crate::Route::load) both go
/// through this type and therefore never disagree.
///
/// # Examples
/// ```
/// use kerbside_core::LoadTally;
///
/// let mut tally = LoadTally::default();
/// tally.add(0.3);
/// tally.add(0.1);
/// assert_eq!(tally.total_with(0.2), LoadTally::from_loads([0.2, 0.3, 0.1]).total());
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadTally {
    loads: Vec<f64>,
}

impl LoadTally {
    /// Tally the given loads.
    pub fn from_loads<I>(loads: I) -> Self
    where
        I: IntoIterator<Item = f64>,
    {
        let mut tally = Self::default();
        for load in loads {
            tally.add(load);
        }
        tally
    }

    /// Tally the loads of `containers`.
    pub fn from_containers<'a, I>(containers: I) -> Self
    where
        I: IntoIterator<Item = &'a Container>,
    {
        Self::from_loads(containers.into_iter().map(Container::load))
    }

    /// Add one load.
    pub fn add(&mut self, load: f64) {
        let slot = self.slot_for(load);
        self.loads.insert(slot, load);
    }

    /// Summed load.
    #[must_use]
    pub fn total(&self) -> f64 {
        self.loads.iter().sum()
    }

    /// Summed load if `load` were added, without adding it.
    #[must_use]
    pub fn total_with(&self, load: f64) -> f64 {
        let (below, above) = self.loads.split_at(self.slot_for(load));
        below.iter().chain(std::iter::once(&load)).chain(above).sum()
    }

    fn slot_for(&self, load: f64) -> usize {
        self.loads
            .partition_point(|existing| existing.total_cmp(&load) == Ordering::Less)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn location() -> GeoPoint {
        GeoPoint::new(11.54752, -72.91351).expect("valid location")
    }

    #[rstest]
    #[case(ContainerStatus::Empty, false)]
    #[case(ContainerStatus::Filling, false)]
    #[case(ContainerStatus::Ready, true)]
    #[case(ContainerStatus::Filled, true)]
    fn only_ready_and_filled_are_collectable(
        #[case] status: ContainerStatus,
        #[case] expected: bool,
    ) {
        assert_eq!(status.is_collectable(), expected);
    }

    #[rstest]
    fn status_round_trips_through_display(
        #[values(
            ContainerStatus::Empty,
            ContainerStatus::Filling,
            ContainerStatus::Ready,
            ContainerStatus::Filled
        )]
        status: ContainerStatus,
    ) {
        assert_eq!(status.to_string().parse::<ContainerStatus>(), Ok(status));
    }

    #[rstest]
    fn status_parsing_ignores_case_and_whitespace() {
        assert_eq!(" FILLED ".parse::<ContainerStatus>(), Ok(ContainerStatus::Filled));
    }

    #[rstest]
    fn status_parsing_rejects_unknown() {
        let err = "overflowing"
            .parse::<ContainerStatus>()
            .expect_err("unknown status");
        assert!(err.to_string().contains("unknown container status"));
    }

    #[rstest]
    fn default_status_is_ready() {
        assert_eq!(ContainerStatus::default(), ContainerStatus::Ready);
    }

    #[rstest]
    #[case(-1.0)]
    #[case(f64::NAN)]
    #[case(f64::INFINITY)]
    fn rejects_invalid_volume(location: GeoPoint, #[case] volume: f64) {
        let result = Container::new(1, location, volume, ContainerStatus::Ready);
        assert!(matches!(
            result,
            Err(ContainerError::InvalidVolume { id: 1, .. })
        ));
    }

    #[rstest]
    fn rejects_invalid_location() {
        let location = GeoPoint {
            latitude: 120.0,
            longitude: 0.0,
        };
        let result = Container::new(1, location, 10.0, ContainerStatus::Ready);
        assert!(matches!(result, Err(ContainerError::InvalidCoordinate(_))));
    }

    #[rstest]
    fn load_counts_only_collectable_volume(location: GeoPoint) {
        let ready = Container::new(1, location, 1000.0, ContainerStatus::Ready).expect("valid");
        let empty = Container::new(2, location, 1000.0, ContainerStatus::Empty).expect("valid");
        assert_eq!(ready.load(), 1000.0);
        assert_eq!(empty.load(), 0.0);
    }

    #[rstest]
    fn tally_total_ignores_insertion_order() {
        let forward = LoadTally::from_loads([0.1, 0.2, 0.3]);
        let backward = LoadTally::from_loads([0.3, 0.2, 0.1]);
        assert_eq!(forward.total(), backward.total());
    }

    #[rstest]
    fn tally_total_with_matches_adding(
        #[values(0.0, 0.1, 0.2, 0.25, 0.3, 5.0)] extra: f64,
    ) {
        let mut tally = LoadTally::from_loads([0.3, 0.1, 0.2, 0.2]);
        let predicted = tally.total_with(extra);
        tally.add(extra);
        assert_eq!(predicted, tally.total());
    }

    #[rstest]
    fn tally_skips_uncollectable_containers(location: GeoPoint) {
        let ready = Container::new(1, location, 0.5, ContainerStatus::Ready).expect("valid");
        let idle = Container::new(2, location, 9.0, ContainerStatus::Filling).expect("valid");
        assert_eq!(LoadTally::from_containers([&ready, &idle]).total(), 0.5);
    }
}
