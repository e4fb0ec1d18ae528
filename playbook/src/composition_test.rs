use super::*;

#[test]
fn agent_table_has_unique_names() {
    let mut names: Vec<&str> = AGENTS.iter().map(|a| a.name).collect();
    names.sort_unstable();
    names.dedup();
    assert_eq!(names.len(), AGENTS.len());
}

#[test]
fn role_filter() {
    let controllers: Vec<&str> = agents_by_role(Some(Role::Controller)).map(|a| a.name).collect();
    assert_eq!(controllers, vec!["Brimstone", "Viper", "Omen", "Astra", "Harbor", "Clove"]);
    assert_eq!(agents_by_role(None).count(), AGENTS.len());
}

#[test]
fn add_fills_first_empty_slot() {
    let mut comp = Composition::default();
    assert_eq!(comp.add("Jett"), Ok(0));
    assert_eq!(comp.add("Omen"), Ok(1));
    comp.clear_slot(0).unwrap();
    assert_eq!(comp.add("Sova"), Ok(0));
}

#[test]
fn add_rejects_duplicates_and_overflow() {
    let mut comp = Composition::from_agents(["Jett", "Omen", "Sova", "Killjoy", "Breach"]).unwrap();
    assert!(comp.is_full());
    assert_eq!(comp.add("Raze"), Err(CompositionError::Full));
    assert_eq!(comp.add("Jett"), Err(CompositionError::AlreadyInComposition("Jett".into())));
}

#[test]
fn set_slot_swaps_existing_agent() {
    let mut comp = Composition::from_agents(["Jett", "Omen"]).unwrap();
    comp.set_slot(1, "Jett").unwrap();
    assert_eq!(comp.slots()[0].as_deref(), Some("Omen"));
    assert_eq!(comp.slots()[1].as_deref(), Some("Jett"));

    comp.set_slot(4, "Sage").unwrap();
    assert_eq!(comp.slots()[4].as_deref(), Some("Sage"));
    assert_eq!(comp.set_slot(5, "Raze"), Err(CompositionError::SlotOutOfRange(5)));
}

#[test]
fn swap_into_empty_slot_moves_agent() {
    let mut comp = Composition::from_agents(["Jett"]).unwrap();
    comp.set_slot(3, "Jett").unwrap();
    assert_eq!(comp.slots()[0], None);
    assert_eq!(comp.slots()[3].as_deref(), Some("Jett"));
}

#[test]
fn stats_total_known_agents() {
    let comp = Composition::from_agents(["Jett", "Omen", "Sova", "Killjoy", "Newcomer"]).unwrap();
    let stats = comp.stats();
    assert_eq!(stats.credits, 550 + 600 + 700 + 600);
    assert_eq!(stats.orbs, 8 + 7 + 8 + 9);
    assert_eq!(stats.missing_cost, vec!["Newcomer"]);
}

#[test]
fn attributes_sorted_by_count_then_name() {
    let comp = Composition::from_agents(["Jett", "Raze", "Omen"]).unwrap();
    let tally = comp.attributes();
    let flat: Vec<(&str, usize)> = tally.iter().map(|a| (a.attribute.as_str(), a.count)).collect();
    assert_eq!(
        flat,
        vec![("Mobility", 2), ("Smoke", 2), ("Damage", 1), ("Flash", 1), ("Teleport", 1)]
    );
}

#[test]
fn empty_composition_has_no_attributes() {
    assert!(Composition::default().attributes().is_empty());
    assert_eq!(Composition::default().stats(), CompStats::default());
}
