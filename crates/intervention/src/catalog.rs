//! Static intervention catalog

use serde::{Deserialize, Serialize};

/// Catalog intervention identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InterventionType {
    /// Soft chime plus a short spoken reminder.
    AudioMild,
    /// Dashboard visual cue only.
    VisualCue,
    /// Insistent spoken prompt.
    AudioModerate,
    /// Loud alarm plus spoken instruction to pull over.
    AudioUrgent,
    /// Dedicated camera-loss notification.
    NoFaceAlert,
    /// Advisory text passthrough.
    Coaching,
}

impl InterventionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            InterventionType::AudioMild => "Audio_Mild",
            InterventionType::VisualCue => "Visual_Cue",
            InterventionType::AudioModerate => "Audio_Moderate",
            InterventionType::AudioUrgent => "Audio_Urgent",
            InterventionType::NoFaceAlert => "NoFace_Alert",
            InterventionType::Coaching => "Coaching",
        }
    }
}

impl std::fmt::Display for InterventionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One catalog entry. Immutable at runtime.
#[derive(Debug, Clone)]
pub struct InterventionDef {
    pub itype: InterventionType,
    /// Escalation tier 1-3.
    pub level: u8,
    /// Candidate messages, catalog order.
    pub messages: &'static [&'static str],
    /// Effectiveness score before any driver history exists.
    pub default_score: f64,
}

/// The intervention catalog, ordered. Catalog order breaks score ties.
#[derive(Debug, Clone)]
pub struct Catalog {
    defs: Vec<InterventionDef>,
}

impl Catalog {
    /// The built-in production catalog.
    pub fn builtin() -> Self {
        Self {
            defs: vec![
                InterventionDef {
                    itype: InterventionType::AudioMild,
                    level: 1,
                    messages: &[
                        "You seem a little tired. Consider taking a short break soon.",
                        "Stay sharp out there. A quick stretch at the next stop could help.",
                    ],
                    default_score: 0.5,
                },
                InterventionDef {
                    itype: InterventionType::VisualCue,
                    level: 1,
                    messages: &[
                        "Fatigue indicator on: watch your alertness.",
                        "Gentle reminder: keep your eyes on the road ahead.",
                    ],
                    default_score: 0.5,
                },
                InterventionDef {
                    itype: InterventionType::AudioModerate,
                    level: 2,
                    messages: &[
                        "Please pay attention. Signs of fatigue are increasing.",
                        "Your attention is drifting. Consider pulling over for a rest.",
                    ],
                    default_score: 0.5,
                },
                InterventionDef {
                    itype: InterventionType::AudioUrgent,
                    level: 3,
                    messages: &[
                        "Warning! You appear severely fatigued. Pull over safely now.",
                        "Immediate attention required. Find a safe place to stop.",
                    ],
                    default_score: 0.5,
                },
                InterventionDef {
                    itype: InterventionType::NoFaceAlert,
                    level: 2,
                    messages: &[
                        "Driver monitoring lost sight of you. Please face forward.",
                    ],
                    default_score: 0.5,
                },
                InterventionDef {
                    itype: InterventionType::Coaching,
                    level: 1,
                    messages: &[],
                    default_score: 0.5,
                },
            ],
        }
    }

    /// Build a custom catalog (tests, fleet-specific configs).
    pub fn new(defs: Vec<InterventionDef>) -> Self {
        Self { defs }
    }

    pub fn defs(&self) -> &[InterventionDef] {
        &self.defs
    }

    pub fn by_type(&self, itype: InterventionType) -> Option<&InterventionDef> {
        self.defs.iter().find(|d| d.itype == itype)
    }

    /// Entries at exactly the given level, catalog order.
    pub fn at_level(&self, level: u8) -> Vec<&InterventionDef> {
        self.defs.iter().filter(|d| d.level == level).collect()
    }

    /// Entries at or below the given level, catalog order.
    pub fn up_to_level(&self, level: u8) -> Vec<&InterventionDef> {
        self.defs.iter().filter(|d| d.level <= level).collect()
    }

    /// Default score for a type, falling back to the range midpoint
    /// for types absent from this catalog.
    pub fn default_score(&self, itype: InterventionType) -> f64 {
        self.by_type(itype).map(|d| d.default_score).unwrap_or(0.5)
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::builtin()
    }
}
