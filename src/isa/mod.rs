//! Installs the base RV64I/RV64M instruction set into a registry (§4.D).
//! Extension packs can register further descriptors afterward through
//! [`crate::cpu::Cpu::extend_isa`]; this module only wires up the variants
//! this specification requires.

pub mod rv64i;
pub mod rv64m;

use crate::registry::Registry;

pub fn install_base_isa(registry: &mut Registry) {
    registry.append(rv64i::DESCRIPTORS);
    registry.append(rv64m::DESCRIPTORS);
    #[cfg(debug_assertions)]
    check_for_overlaps(registry);
}

/// Debug-only pairwise overlap check: two descriptors' `(mask,
/// required_bits)` pairs overlap if some bit pattern could satisfy both,
/// i.e. their required bits agree everywhere the masks intersect. The
/// registry's first-match-wins semantics (§3) already make this safe to
/// ship even with an overlap, so this only warns; it never changes lookup
/// behavior.
#[cfg(debug_assertions)]
fn check_for_overlaps(registry: &Registry) {
    use itertools::Itertools;

    for (a, b) in registry.iter().tuple_combinations() {
        let shared_mask = a.mask & b.mask;
        if (a.required_bits & shared_mask) == (b.required_bits & shared_mask) {
            log::warn!(
                "descriptors '{}' and '{}' can both match the same encoding; '{}' wins on overlap",
                a.name,
                b.name,
                a.name
            );
        }
    }
}
