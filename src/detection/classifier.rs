// src/detection/classifier.rs
//
// Landmark geometry → gesture class.
//
// A finger is extended when its tip sits above its PIP joint and curled when
// the tip sits below it (image y grows downwards, hand held upright). Equal or
// non-finite coordinates count as neither.

use super::landmarks::*;
use crate::error::{Result, ScoringError};
use crate::types::{GestureClass, LandmarkSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FingerPose {
    Extended,
    Curled,
    Ambiguous,
}

#[derive(Debug, Clone, Copy)]
struct HandPose {
    index: FingerPose,
    middle: FingerPose,
    ring: FingerPose,
    pinky: FingerPose,
}

fn finger_pose(hand: &LandmarkSet, tip: usize, pip: usize) -> FingerPose {
    let (Some(tip), Some(pip)) = (hand.get(tip), hand.get(pip)) else {
        return FingerPose::Ambiguous;
    };
    if tip.y < pip.y {
        FingerPose::Extended
    } else if tip.y > pip.y {
        FingerPose::Curled
    } else {
        // NaN lands here too
        FingerPose::Ambiguous
    }
}

impl HandPose {
    fn from_landmarks(hand: &LandmarkSet) -> Self {
        Self {
            index: finger_pose(hand, INDEX_FINGER_TIP, INDEX_FINGER_PIP),
            middle: finger_pose(hand, MIDDLE_FINGER_TIP, MIDDLE_FINGER_PIP),
            ring: finger_pose(hand, RING_FINGER_TIP, RING_FINGER_PIP),
            pinky: finger_pose(hand, PINKY_TIP, PINKY_PIP),
        }
    }

    fn matches(&self, class: GestureClass) -> bool {
        use FingerPose::{Curled, Extended};
        let fingers = (self.index, self.middle, self.ring, self.pinky);
        match class {
            GestureClass::IndexFinger => fingers == (Extended, Curled, Curled, Curled),
            GestureClass::VSign => fingers == (Extended, Extended, Curled, Curled),
            GestureClass::LittleFinger => fingers == (Curled, Curled, Curled, Extended),
        }
    }
}

/// Checked in this order; the first match wins if noise ever makes two agree
const PRECEDENCE: [GestureClass; 3] = [
    GestureClass::VSign,
    GestureClass::IndexFinger,
    GestureClass::LittleFinger,
];

/// Classify one hand, reporting hands with missing landmarks
pub fn try_classify(hand: &LandmarkSet) -> Result<Option<GestureClass>> {
    if hand.len() < HAND_LANDMARK_COUNT {
        return Err(ScoringError::MalformedLandmarkSet {
            expected: HAND_LANDMARK_COUNT,
            found: hand.len(),
        });
    }

    let pose = HandPose::from_landmarks(hand);
    Ok(PRECEDENCE.into_iter().find(|class| pose.matches(*class)))
}

/// Total version of [`try_classify`]: malformed hands are simply "no gesture"
pub fn classify(hand: &LandmarkSet) -> Option<GestureClass> {
    try_classify(hand).ok().flatten()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::types::LandmarkPoint;

    /// Build an upright hand with the given fingers extended
    pub(crate) fn hand(index: bool, middle: bool, ring: bool, pinky: bool) -> LandmarkSet {
        let mut points = vec![LandmarkPoint::new(0.5, 0.8); HAND_LANDMARK_COUNT];
        let fingers = [
            (INDEX_FINGER_PIP, INDEX_FINGER_TIP, index, 0.40),
            (MIDDLE_FINGER_PIP, MIDDLE_FINGER_TIP, middle, 0.48),
            (RING_FINGER_PIP, RING_FINGER_TIP, ring, 0.56),
            (PINKY_PIP, PINKY_TIP, pinky, 0.64),
        ];
        for (pip, tip, extended, x) in fingers {
            points[pip] = LandmarkPoint::new(x, 0.5);
            points[tip] = LandmarkPoint::new(x, if extended { 0.3 } else { 0.6 });
        }
        LandmarkSet::new(points)
    }

    #[test]
    fn test_index_finger() {
        assert_eq!(
            classify(&hand(true, false, false, false)),
            Some(GestureClass::IndexFinger)
        );
    }

    #[test]
    fn test_v_sign() {
        assert_eq!(
            classify(&hand(true, true, false, false)),
            Some(GestureClass::VSign)
        );
    }

    #[test]
    fn test_little_finger() {
        assert_eq!(
            classify(&hand(false, false, false, true)),
            Some(GestureClass::LittleFinger)
        );
    }

    #[test]
    fn test_unrecognised_shapes() {
        assert_eq!(classify(&hand(false, false, false, false)), None); // fist
        assert_eq!(classify(&hand(true, true, true, true)), None); // open palm
        assert_eq!(classify(&hand(true, false, false, true)), None); // horns
        assert_eq!(classify(&hand(true, true, true, false)), None);
    }

    #[test]
    fn test_level_finger_is_neither() {
        let mut h = hand(true, false, false, false);
        h.points[MIDDLE_FINGER_TIP].y = h.points[MIDDLE_FINGER_PIP].y;
        assert_eq!(classify(&h), None);
    }

    #[test]
    fn test_nan_coordinates() {
        let mut h = hand(true, false, false, false);
        h.points[INDEX_FINGER_TIP].y = f32::NAN;
        assert_eq!(classify(&h), None);
    }

    #[test]
    fn test_malformed_hand() {
        let mut h = hand(true, false, false, false);
        h.points.truncate(12);
        assert!(matches!(
            try_classify(&h),
            Err(ScoringError::MalformedLandmarkSet {
                expected: 21,
                found: 12
            })
        ));
        assert_eq!(classify(&h), None);
        assert_eq!(classify(&LandmarkSet::default()), None);
    }
}
