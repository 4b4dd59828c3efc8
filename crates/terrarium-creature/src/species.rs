//! Species: a randomly grown body plan and the genes derived from it
//!
//! Bodies are trees of tagged parts. Physiology genes come from counting part
//! kinds across the tree; behavioural genes start from fixed defaults.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::genome::{GeneKey, Genes};

/// Maximum number of children grown below a single part
pub const MAX_CHILDREN: u32 = 6;

/// Deepest body tree a species is generated with
pub const MAX_BODY_DEPTH: u32 = 4;

/// Kind of body part
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PartKind {
    Core,
    Limb,
    Head,
    Mouth,
}

/// Geometry of a body part, in body-local units
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PartShape {
    Round { radius: f32 },
    Segment { length: f32, thickness: f32 },
}

/// One node of a body tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BodyPart {
    pub kind: PartKind,
    pub color: [f32; 3],
    pub angle: f32,
    pub shape: PartShape,
    pub children: Vec<BodyPart>,
}

/// Number of parts of each kind in a body tree
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PartCounts {
    pub cores: u32,
    pub limbs: u32,
    pub heads: u32,
    pub mouths: u32,
}

impl PartCounts {
    pub fn total(&self) -> u32 {
        self.cores + self.limbs + self.heads + self.mouths
    }
}

impl BodyPart {
    /// Create a leaf part with no children
    pub fn new(kind: PartKind, shape: PartShape) -> Self {
        Self {
            kind,
            color: [0.5, 0.5, 0.5],
            angle: 0.0,
            shape,
            children: Vec::new(),
        }
    }

    /// Attach a child part (builder style)
    pub fn with_child(mut self, child: BodyPart) -> Self {
        self.children.push(child);
        self
    }

    /// Grow a random body tree `depth` levels deep
    ///
    /// Every node is a core or a limb. Nodes above the last level get between
    /// zero and [`MAX_CHILDREN`] children, each grown one level shallower.
    pub fn generate<R: Rng + ?Sized>(rng: &mut R, depth: u32) -> Self {
        let (kind, shape) = if rng.gen_bool(0.5) {
            (
                PartKind::Core,
                PartShape::Round {
                    radius: rng.gen_range(0.0..3.0),
                },
            )
        } else {
            (
                PartKind::Limb,
                PartShape::Segment {
                    length: rng.gen_range(6.0..12.0),
                    thickness: rng.gen_range(0.0..1.0),
                },
            )
        };
        let color = [
            rng.gen_range(0.0..1.0),
            rng.gen_range(0.0..1.0),
            rng.gen_range(0.0..1.0),
        ];

        let mut part = Self {
            kind,
            color,
            angle: 0.0,
            shape,
            children: Vec::new(),
        };

        if depth > 1 {
            let children = rng.gen_range(0..=MAX_CHILDREN);
            part.children = (0..children)
                .map(|_| Self::generate(rng, depth - 1))
                .collect();
        }
        part
    }

    /// Count parts of each kind across the whole tree
    pub fn count_parts(&self) -> PartCounts {
        let mut counts = PartCounts::default();
        self.accumulate(&mut counts);
        counts
    }

    fn accumulate(&self, counts: &mut PartCounts) {
        match self.kind {
            PartKind::Core => counts.cores += 1,
            PartKind::Limb => counts.limbs += 1,
            PartKind::Head => counts.heads += 1,
            PartKind::Mouth => counts.mouths += 1,
        }
        for child in &self.children {
            child.accumulate(counts);
        }
    }

    /// Total number of parts in the tree
    pub fn part_count(&self) -> u32 {
        self.count_parts().total()
    }

    /// Number of levels in the tree (a lone part has depth 1)
    pub fn depth(&self) -> u32 {
        1 + self.children.iter().map(BodyPart::depth).max().unwrap_or(0)
    }
}

/// Gene units contributed by each part kind
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhysiologyFactors {
    /// Per core
    pub strength: f32,
    /// Per limb
    pub speed: f32,
    /// Per head
    pub intelligence: f32,
    /// Per mouth; more mouths make a predator
    pub ferocity: f32,
}

impl Default for PhysiologyFactors {
    fn default() -> Self {
        Self {
            strength: 1.0,
            speed: 2.0,
            intelligence: 1.0,
            ferocity: 1.0,
        }
    }
}

/// Behavioural genes every new species starts from
pub fn default_behavior_genes() -> Genes {
    [
        (GeneKey::CohesionFactor, 1.0 / 100.0),
        (GeneKey::HerdingSeparationFactor, 1.0),
        (GeneKey::HerdingDistance, 10.0),
        (GeneKey::VelocityMatchingFactor, 1.0 / 1000.0),
        (GeneKey::VelocityLimit, 10.0),
        (GeneKey::MoveTowardsFactor, 1.0),
    ]
    .into_iter()
    .collect()
}

/// Derive a full gene set from a body
pub fn derive_genes(body: &BodyPart, factors: &PhysiologyFactors) -> Genes {
    let counts = body.count_parts();
    let mut genes = default_behavior_genes();
    genes.set(GeneKey::Strength, counts.cores as f32 * factors.strength);
    genes.set(GeneKey::Speed, counts.limbs as f32 * factors.speed);
    genes.set(
        GeneKey::Intelligence,
        counts.heads as f32 * factors.intelligence,
    );
    genes.set(GeneKey::Ferocity, counts.mouths as f32 * factors.ferocity);
    genes
}

/// Genetic template shared by all creatures created from it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Species {
    pub name: String,
    pub body: BodyPart,
    pub genes: Genes,
}

impl Species {
    /// Generate a species with a random body between 1 and [`MAX_BODY_DEPTH`] levels deep
    pub fn generate<R: Rng + ?Sized>(name: impl Into<String>, rng: &mut R) -> Self {
        let depth = rng.gen_range(1..=MAX_BODY_DEPTH);
        let body = BodyPart::generate(rng, depth);
        Self::from_body(name, body)
    }

    /// Build a species around a given body
    pub fn from_body(name: impl Into<String>, body: BodyPart) -> Self {
        let genes = derive_genes(&body, &PhysiologyFactors::default());
        let name = name.into();
        log::debug!(
            "Species '{}': {} body parts, {} levels",
            name,
            body.part_count(),
            body.depth()
        );
        Self { name, body, genes }
    }
}
