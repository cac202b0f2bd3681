/// Outcome of a delivery-zone check.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ZoneCheck {
    Allowed,
    Rejected { distance_meters: f64 },
}

/// Accepts a delivery whose route distance is at most `max_radius_meters`.
pub fn check(distance_meters: f64, max_radius_meters: f64) -> ZoneCheck {
    if distance_meters <= max_radius_meters {
        ZoneCheck::Allowed
    } else {
        ZoneCheck::Rejected { distance_meters }
    }
}

/// A [`check`] bound to a configured radius.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeliveryZoneGuard {
    max_radius_meters: f64,
}

impl DeliveryZoneGuard {
    pub fn new(max_radius_meters: f64) -> Self {
        Self { max_radius_meters }
    }

    pub fn max_radius_meters(&self) -> f64 {
        self.max_radius_meters
    }

    pub fn check(&self, distance_meters: f64) -> ZoneCheck {
        check(distance_meters, self.max_radius_meters)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_radius_is_inclusive() {
        let guard = DeliveryZoneGuard::new(3000.0);
        assert_eq!(guard.check(3000.0), ZoneCheck::Allowed);
        assert_eq!(guard.check(0.0), ZoneCheck::Allowed);
        assert_eq!(
            guard.check(3001.0),
            ZoneCheck::Rejected {
                distance_meters: 3001.0
            }
        );
    }
}
