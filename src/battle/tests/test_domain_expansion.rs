#[cfg(test)]
mod tests {
    use crate::battle::input::MoveChoice;
    use crate::clock::Clock;
    use crate::battle::state::{BattleEvent, EventBus, Side, SkipReason};
    use crate::battle::tests::common::{
        create_test_engine, create_test_engine_with, fixed_choices, predictable_rng, TestPetBuilder,
    };
    use crate::config::BattleTuning;
    use crate::moves::MoveCatalog;
    use pretty_assertions::assert_eq;
    use schema::{MoveData, MoveTier, Rarity, Species, DOMAIN_EXPANSION_MOVE};

    #[test]
    fn test_mythic_pet_gets_domain_appended_to_pool() {
        let (engine, _) = create_test_engine();
        let mythic = TestPetBuilder::new(Species::Dragon)
            .with_rarity(Rarity::Mythic)
            .build();
        let side = engine.prepare_side("alice", mythic);
        assert!(side.domain_eligible);
        assert_eq!(side.moves, vec!["Tackle", "Scratch", DOMAIN_EXPANSION_MOVE]);

        let rare = TestPetBuilder::new(Species::Dragon)
            .with_rarity(Rarity::Rare)
            .build();
        let side = engine.prepare_side("alice", rare);
        assert!(!side.domain_eligible);
        assert_eq!(side.moves, vec!["Tackle", "Scratch"]);
    }

    #[test]
    fn test_species_without_catalog_entry_omits_domain() {
        let catalog = MoveCatalog::new(
            vec![MoveTier {
                unlock_level: 1,
                moves: vec![MoveData::new("Tackle", 20, 95)],
            }],
            Vec::new(),
        )
        .unwrap();
        let (engine, _) = create_test_engine_with(catalog, BattleTuning::default());
        let mythic = TestPetBuilder::new(Species::Toaster)
            .with_rarity(Rarity::Mythic)
            .build();
        let side = engine.prepare_side("alice", mythic);
        assert!(!side.domain_eligible);
        assert_eq!(side.moves, vec!["Tackle"]);
    }

    #[tokio::test]
    async fn test_domain_expansion_knocks_out_and_starts_cooldown() {
        // Arrange: Infinite Inferno Sanctum is power 40; at strength 45 it deals 90.
        let (engine, clock) = create_test_engine();
        let dragon = TestPetBuilder::new(Species::Dragon)
            .with_rarity(Rarity::Mythic)
            .with_strength(45)
            .build();
        let dragon_name = dragon.name.clone();
        let penguin = TestPetBuilder::new(Species::Penguin).with_health(90).build();
        let mut source = fixed_choices(2, 0);
        let mut rng = predictable_rng();

        // Act
        let result = engine
            .start_battle(dragon, "alice", penguin, "bob", &mut source, &mut rng)
            .await
            .unwrap();

        // Assert
        assert_eq!(result.winner, Some(Side::A));
        assert_eq!(result.turns, 1);
        assert!(result.events.contains(&BattleEvent::DamageDealt {
            target: Side::B,
            damage: 90.0,
            remaining_health: 0.0,
        }));
        assert!(result.events.iter().any(|event| matches!(
            event,
            BattleEvent::DomainExpansionUnleashed { domain_name, .. } if domain_name == "Infinite Inferno Sanctum"
        )));
        assert_eq!(
            engine.cooldowns().last_use("alice", &dragon_name),
            Some(clock.now())
        );

        // The next battle the same day has no domain in the pool.
        let again = engine.prepare_side("alice", result.pet(Side::A).clone());
        assert!(!again.domain_eligible);

        clock.advance(chrono::Duration::hours(24));
        let tomorrow = engine.prepare_side("alice", result.pet(Side::A).clone());
        assert!(tomorrow.domain_eligible);
    }

    #[test]
    fn test_domain_damage_is_fractional_and_floored_on_persist() {
        // Thousand Needle Desert is power 35; at strength 42 it deals 73.5.
        let tuning = BattleTuning {
            max_turns: 1,
            ..BattleTuning::default()
        };
        let (engine, _) = create_test_engine_with(MoveCatalog::standard(), tuning);
        let cactus = TestPetBuilder::new(Species::Cactus)
            .with_rarity(Rarity::Mythic)
            .with_strength(42)
            .build();
        let robot = TestPetBuilder::new(Species::Robot).build();
        let mut state = engine.create_battle(cactus, "alice", robot, "bob");
        let mut bus = EventBus::new();
        let mut rng = predictable_rng();
        engine.begin(&mut state, &mut bus).unwrap();

        engine
            .apply_choice(&mut state, MoveChoice::Selected(2), &mut rng, &mut bus)
            .unwrap();

        assert_eq!(state.side(Side::B).working_health, 26.5);
        // One turn allowed: the battle is a draw and health is truncated when stored.
        assert!(state.is_concluded());
        assert_eq!(state.winner, None);
        assert_eq!(state.side(Side::B).pet.health, 26);
        assert!(!state.side(Side::A).domain_eligible);
    }

    #[test]
    fn test_domain_expansion_is_spent_after_one_use_in_a_battle() {
        // Infinite Inferno Sanctum at strength 20 deals 40; Tackle deals 20.
        let (engine, _) = create_test_engine();
        let dragon = TestPetBuilder::new(Species::Dragon)
            .with_rarity(Rarity::Mythic)
            .build();
        let penguin = TestPetBuilder::new(Species::Penguin).build();
        let mut state = engine.create_battle(dragon, "alice", penguin, "bob");
        let mut bus = EventBus::new();
        let mut rng = predictable_rng();
        engine.begin(&mut state, &mut bus).unwrap();

        for _ in 0..3 {
            engine
                .apply_choice(&mut state, MoveChoice::Selected(2), &mut rng, &mut bus)
                .unwrap();
            engine
                .apply_choice(&mut state, MoveChoice::Selected(0), &mut rng, &mut bus)
                .unwrap();
        }

        let uses = bus
            .events()
            .iter()
            .filter(|event| matches!(event, BattleEvent::DomainExpansionUnleashed { .. }))
            .count();
        assert_eq!(uses, 1);
        assert_eq!(state.side(Side::B).working_health, 60.0);
        assert_eq!(state.side(Side::A).moves, vec!["Tackle", "Scratch"]);
        assert_eq!(engine.move_request(&state).unwrap().options.len(), 2);
        assert!(bus.events().contains(&BattleEvent::TurnSkipped {
            side: Side::A,
            reason: SkipReason::InvalidSelection { index: 2 },
        }));
    }

    #[test]
    fn test_cooldown_is_per_owner() {
        let (engine, _) = create_test_engine();
        let unicorn = TestPetBuilder::new(Species::Unicorn)
            .with_rarity(Rarity::Mythic)
            .build();
        engine.cooldowns().record_use("alice", &unicorn.name);

        assert!(!engine.prepare_side("alice", unicorn.clone()).domain_eligible);
        assert!(engine.prepare_side("carol", unicorn).domain_eligible);
    }
}
