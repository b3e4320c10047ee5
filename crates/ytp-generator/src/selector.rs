//! Per-clip plan selection.
//!
//! Draw order for each clip is fixed: transition draw, effect draw, stack
//! size (only when effects apply and stacking is allowed), then effect ids.

use ytp_models::{ClipKind, EffectId, EffectPlan, GenerationConfig};

use crate::random::RandomSource;

/// Decides whether a clip is a transition and which effects it stacks.
pub struct EffectSelector;

impl EffectSelector {
    /// Plan one clip. Pure apart from the draws taken from `rng`.
    pub fn plan<R: RandomSource + ?Sized>(config: &GenerationConfig, rng: &mut R) -> EffectPlan {
        let kind = Self::pick_kind(config, rng);

        let enabled = config.enabled_effect_count();
        let roll = rng.int_inclusive(0, 99);
        if roll >= config.effect_probability || enabled == 0 {
            return EffectPlan::new(kind, Vec::new());
        }

        let depth = if config.allow_effect_stacking {
            let ceiling = config.stack_ceiling().max(1) as u32;
            rng.int_inclusive(1, ceiling) as usize
        } else {
            1
        };

        EffectPlan::new(kind, Self::sample_effects(config, depth, rng))
    }

    /// Transition iff the draw hits `transition_probability` and transitions are on.
    fn pick_kind<R: RandomSource + ?Sized>(config: &GenerationConfig, rng: &mut R) -> ClipKind {
        let p = config.transition_probability.max(1);
        let draw = rng.int_inclusive(1, p);
        if draw == p && config.insert_transition_clips {
            ClipKind::Transition
        } else {
            ClipKind::Snippet
        }
    }

    /// Rejection-sample `depth` distinct enabled ids over the full catalog range.
    ///
    /// `depth` never exceeds the enabled count, so the loop terminates.
    fn sample_effects<R: RandomSource + ?Sized>(
        config: &GenerationConfig,
        depth: usize,
        rng: &mut R,
    ) -> Vec<EffectId> {
        let depth = depth.min(config.enabled_effect_count());
        let mut visited = [false; EffectId::COUNT];
        let mut chosen = Vec::with_capacity(depth);

        while chosen.len() < depth {
            let index = rng.int_inclusive(0, (EffectId::COUNT - 1) as u32) as usize;
            if config.effects.is_index_enabled(index) && !visited[index] {
                visited[index] = true;
                if let Some(effect) = EffectId::from_index(index) {
                    chosen.push(effect);
                }
            }
        }

        chosen
    }
}
