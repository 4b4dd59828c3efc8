//! Entity ids handed in from outside the process
//!
//! Runs in its own test binary: pushing the id counter to its ceiling would
//! disturb the unit tests that allocate fresh ids.

use terrarium_creature::EntityId;

#[test]
fn test_from_raw_at_id_ceiling() {
    let id = EntityId::from_raw(u64::MAX);
    assert_eq!(id.raw(), u64::MAX);

    // A second registration at the ceiling must not overflow either
    let again = EntityId::from_raw(u64::MAX);
    assert_eq!(again, id);
}
