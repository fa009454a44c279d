//! Ending resolution: a priority decision tree over the final state.
//!
//! The tree branches on the recommended-admission flag first, then on
//! graduation, then picks a remark in strict priority order
//! health > social > skill > exceptional/plain.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::constants::endings as limits;
use crate::state::SimulationState;

/// Qualifier attached to an ending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Remark {
    LowHealth,
    LowSocial,
    LowSkill,
    /// Graduated with skill >= 90, or failed to graduate with any stat >= 90.
    Standout,
    Plain,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Ending {
    /// Qualified for recommended admission but the thesis was never finished.
    RecommendationVoided,
    /// Qualified and graduated.
    FurtherStudy(Remark),
    /// Qualified and thesis done, but credits fell short.
    RecommendationForfeited,
    Graduated(Remark),
    NotGraduated(Remark),
}

/// Pick the ending for a finished session.
pub fn resolve_ending(state: &SimulationState) -> Ending {
    let graduated = state.meets_graduation_requirements();
    let low_health = state.health < limits::LOW_HEALTH;
    let low_social = state.social < limits::LOW_SOCIAL;
    let low_skill = state.skill < limits::LOW_SKILL;

    if state.baoyan_qualified {
        if !state.thesis_complete() {
            return Ending::RecommendationVoided;
        }
        if !graduated {
            return Ending::RecommendationForfeited;
        }
        let remark = if low_health {
            Remark::LowHealth
        } else if low_social {
            Remark::LowSocial
        } else if low_skill {
            Remark::LowSkill
        } else {
            Remark::Plain
        };
        return Ending::FurtherStudy(remark);
    }

    if graduated {
        let remark = if low_health {
            Remark::LowHealth
        } else if low_social {
            Remark::LowSocial
        } else if low_skill {
            Remark::LowSkill
        } else if state.skill >= limits::STANDOUT {
            Remark::Standout
        } else {
            Remark::Plain
        };
        return Ending::Graduated(remark);
    }

    let remark = if state.health < limits::VERY_LOW_HEALTH {
        Remark::LowHealth
    } else if [state.knowledge, state.skill, state.social]
        .iter()
        .any(|&v| v >= limits::STANDOUT)
    {
        Remark::Standout
    } else {
        Remark::Plain
    };
    Ending::NotGraduated(remark)
}

impl Ending {
    pub fn title(&self) -> &'static str {
        match self {
            Ending::RecommendationVoided => "Ending: Recommendation Voided",
            Ending::FurtherStudy(_) => "Ending: Further Study",
            Ending::RecommendationForfeited | Ending::NotGraduated(_) => "Ending: Did Not Graduate",
            Ending::Graduated(Remark::Standout) => "Ending: Hero",
            Ending::Graduated(_) => "Ending: Graduation",
        }
    }

    /// Closing text. Some endings have several variants; one is drawn.
    pub fn narrative(&self, rng: &mut impl Rng) -> &'static str {
        let variants: &[&'static str] = match self {
            Ending::RecommendationVoided => &[
                "You did not graduate on time and your recommended place was withdrawn. The real pain is not that you couldn't, but that you could have.",
                "You did not graduate on time and your recommended place was withdrawn. Never let one success make you lose your way.",
            ],
            Ending::FurtherStudy(Remark::LowHealth) => &[
                "You graduated and moved on to graduate school. A new future awaits; remember to look after yourself.",
            ],
            Ending::FurtherStudy(Remark::LowSocial) => &[
                "You graduated and moved on to graduate school. Be braver about stepping outside yourself.",
            ],
            Ending::FurtherStudy(Remark::LowSkill) => &[
                "You graduated and moved on to graduate school. The study goes on, but where does the road after it lead?",
            ],
            Ending::FurtherStudy(_) => &[
                "You graduated and moved on to graduate school. May the spirit of seeking truth walk with you; your alma mater is always with you.",
                "You graduated and moved on to graduate school. Keep the curiosity you arrived with.",
            ],
            Ending::RecommendationForfeited => &[
                "You did not graduate on time and your recommended place was withdrawn.",
            ],
            Ending::Graduated(Remark::LowHealth) => &[
                "You graduated. As you leave campus, please take good care of yourself.",
            ],
            Ending::Graduated(Remark::LowSocial) => &[
                "You graduated. May you find a little more courage to embrace the world.",
            ],
            Ending::Graduated(Remark::LowSkill) => &[
                "You graduated. The road ahead may still be hard, but your alma mater is proud of you.",
                "You graduated. May these years have given you the nerve to take on the world.",
            ],
            Ending::Graduated(Remark::Standout) => &[
                "You graduated. The sky is high and the sea is wide; who in the world is the hero now?",
                "You graduated. Fear not the road ahead without friends; the whole world knows your name.",
            ],
            Ending::Graduated(_) => &[
                "You graduated. The road is long; may this journey carry you further.",
                "You graduated. Be your own star on the journey ahead; your alma mater is proud of you.",
                "Walk the road ahead and never ask who the hero is.",
            ],
            Ending::NotGraduated(Remark::LowHealth) => &[
                "You did not graduate on time. In the year ahead, look after your studies and look after yourself even more.",
            ],
            Ending::NotGraduated(Remark::Standout) => &[
                "You did not graduate on time. Not every flower blooms in spring; your season will come.",
            ],
            Ending::NotGraduated(_) => &[
                "You did not graduate on time. Pick yourself up this coming year: read widely, take carefully, build up and break through.",
            ],
        };
        variants.choose(rng).copied().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::{Faculty, FamilyTier};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn finished(credits: u32, thesis: i32) -> SimulationState {
        let mut s = SimulationState::new(Faculty::Social, FamilyTier::Ordinary);
        s.credits_earned_total = credits;
        s.thesis_progress = thesis;
        s.health = 85;
        s.social = 85;
        s.skill = 85;
        s.knowledge = 85;
        s
    }

    #[test]
    fn test_generic_graduation() {
        let s = finished(160, 100);
        assert_eq!(resolve_ending(&s), Ending::Graduated(Remark::Plain));
    }

    #[test]
    fn test_graduation_priority_order() {
        let mut s = finished(160, 100);
        s.health = 75;
        s.social = 55;
        s.skill = 55;
        assert_eq!(resolve_ending(&s), Ending::Graduated(Remark::LowHealth));
        s.health = 85;
        assert_eq!(resolve_ending(&s), Ending::Graduated(Remark::LowSocial));
        s.social = 85;
        assert_eq!(resolve_ending(&s), Ending::Graduated(Remark::LowSkill));
        s.skill = 95;
        assert_eq!(resolve_ending(&s), Ending::Graduated(Remark::Standout));
    }

    #[test]
    fn test_recommendation_branch() {
        let mut s = finished(160, 60);
        s.baoyan_qualified = true;
        assert_eq!(resolve_ending(&s), Ending::RecommendationVoided);
        // voided even when credits are short
        s.credits_earned_total = 10;
        assert_eq!(resolve_ending(&s), Ending::RecommendationVoided);

        s.thesis_progress = 100;
        assert_eq!(resolve_ending(&s), Ending::RecommendationForfeited);
        s.credits_earned_total = 160;
        assert_eq!(resolve_ending(&s), Ending::FurtherStudy(Remark::Plain));
        // skill >= 90 does not change the further-study remark
        s.skill = 95;
        assert_eq!(resolve_ending(&s), Ending::FurtherStudy(Remark::Plain));
        s.social = 55;
        assert_eq!(resolve_ending(&s), Ending::FurtherStudy(Remark::LowSocial));
    }

    #[test]
    fn test_not_graduated_remarks() {
        let mut s = finished(100, 100);
        s.health = 75;
        // 75 is low for graduates but not below the not-graduated cut
        assert_eq!(resolve_ending(&s), Ending::NotGraduated(Remark::Plain));
        s.knowledge = 92;
        assert_eq!(resolve_ending(&s), Ending::NotGraduated(Remark::Standout));
        s.health = 65;
        assert_eq!(resolve_ending(&s), Ending::NotGraduated(Remark::LowHealth));
    }

    #[test]
    fn test_every_ending_has_text() {
        let mut rng = StdRng::seed_from_u64(1);
        let remarks = [
            Remark::LowHealth,
            Remark::LowSocial,
            Remark::LowSkill,
            Remark::Standout,
            Remark::Plain,
        ];
        let mut endings = vec![Ending::RecommendationVoided, Ending::RecommendationForfeited];
        for r in remarks {
            endings.extend([Ending::FurtherStudy(r), Ending::Graduated(r), Ending::NotGraduated(r)]);
        }
        for e in endings {
            assert!(!e.narrative(&mut rng).is_empty(), "{:?}", e);
            assert!(!e.title().is_empty());
        }
    }
}
