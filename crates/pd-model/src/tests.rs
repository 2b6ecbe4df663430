//! Unit tests for pd-model.

#[cfg(test)]
mod fixtures {
    use pd_agent::{AgentBuilder, GenericAgent, ModelType};
    use pd_core::{AgentId, LineSegment, ParametersId, Point};
    use pd_spatial::{RTreeNeighborhood, SegmentGeometry};

    pub const DT: f64 = 0.01;

    /// Agent at `(x, y)` facing +x, heading for `(dest_x, y)`.
    pub fn agent(model: ModelType, id: u64, x: f64, y: f64, dest_x: f64) -> GenericAgent {
        AgentBuilder::new(AgentId(id), model)
            .position(Point::new(x, y))
            .destination(Point::new(dest_x, y))
            .orientation(Point::new(if dest_x >= x { 1.0 } else { -1.0 }, 0.0))
            .parameters(ParametersId(0))
            .build()
    }

    pub fn open_space() -> SegmentGeometry {
        SegmentGeometry::empty()
    }

    pub fn floor_wall() -> SegmentGeometry {
        SegmentGeometry::new(vec![LineSegment::new(Point::new(-5.0, 0.0), Point::new(5.0, 0.0))]).unwrap()
    }

    pub fn index(agents: &[GenericAgent]) -> RTreeNeighborhood {
        RTreeNeighborhood::build(agents)
    }
}

#[cfg(test)]
mod interaction {
    use pd_agent::ModelType;
    use pd_core::{LineSegment, Point};
    use pd_spatial::SegmentGeometry;

    use super::fixtures::{agent, index, open_space};
    use crate::interaction::{combined_direction, optimal_speed, spacing, visible_neighbors};

    #[test]
    fn spacing_of_neighbor_ahead_in_corridor() {
        let s = spacing(Point::ZERO, Point::new(1.0, 0.0), Point::new(3.0, 0.0), 0.4);
        assert!((s - 2.6).abs() < 1e-12);
    }

    #[test]
    fn spacing_ignores_neighbor_behind_or_beside() {
        let dir = Point::new(1.0, 0.0);
        assert_eq!(spacing(Point::ZERO, dir, Point::new(-1.0, 0.0), 0.4), f64::INFINITY);
        assert_eq!(spacing(Point::ZERO, dir, Point::new(3.0, 0.5), 0.4), f64::INFINITY);
    }

    #[test]
    fn optimal_speed_is_clamped() {
        assert_eq!(optimal_speed(f64::INFINITY, 1.0, 1.2), 1.2);
        assert_eq!(optimal_speed(0.6, 1.0, 1.2), 0.6);
        assert_eq!(optimal_speed(-0.3, 1.0, 1.2), 0.0);
    }

    #[test]
    fn degenerate_direction_falls_back_to_orientation() {
        let orientation = Point::new(0.0, 1.0);
        let d = combined_direction(Point::new(1.0, 0.0), Point::new(-1.0, 0.0), orientation);
        assert_eq!(d, orientation);
    }

    #[test]
    fn occluded_neighbors_are_dropped_and_rest_sorted() {
        let me = agent(ModelType::CollisionFreeSpeed, 5, 0.0, 0.0, 10.0);
        let agents = vec![
            me.clone(),
            agent(ModelType::CollisionFreeSpeed, 3, 0.0, 1.0, 10.0),
            agent(ModelType::CollisionFreeSpeed, 1, 0.0, -1.0, 10.0),
            agent(ModelType::CollisionFreeSpeed, 2, 2.0, 0.0, 10.0),
        ];
        let idx = index(&agents);

        let ids: Vec<u64> = visible_neighbors(&me, 3.0, &open_space(), &idx).iter().map(|a| a.id.0).collect();
        assert_eq!(ids, vec![1, 2, 3]);

        let wall = SegmentGeometry::new(vec![LineSegment::new(Point::new(1.0, -0.5), Point::new(1.0, 0.5))]).unwrap();
        let ids: Vec<u64> = visible_neighbors(&me, 3.0, &wall, &idx).iter().map(|a| a.id.0).collect();
        assert_eq!(ids, vec![1, 3]);
    }
}

#[cfg(test)]
mod repulsion {
    use approx::assert_relative_eq;

    use crate::{ModelError, RepulsionLaw};

    #[test]
    fn rejects_invalid_parameters() {
        assert!(matches!(RepulsionLaw::new(2.0, 0.0, 3.0), Err(ModelError::InvalidConfig(_))));
        assert!(matches!(RepulsionLaw::new(2.0, 0.1, 0.0), Err(ModelError::InvalidConfig(_))));
        // left = 0.6, right = 0.5
        assert!(matches!(RepulsionLaw::new(0.6, 0.1, 3.0), Err(ModelError::InvalidConfig(_))));
        assert!(matches!(RepulsionLaw::new(f64::NAN, 0.1, 3.0), Err(ModelError::InvalidConfig(_))));
    }

    #[test]
    fn regime_boundaries() {
        let law = RepulsionLaw::default();
        assert_relative_eq!(law.smax(), 0.4, epsilon = 1e-12);
        assert_relative_eq!(law.dist_intpol_left(), 0.6, epsilon = 1e-12);
        assert_relative_eq!(law.dist_intpol_right(), 1.9, epsilon = 1e-12);
    }

    #[test]
    fn continuous_at_every_boundary() {
        let law = RepulsionLaw::default();
        let n = 1.7;
        let right = law.dist_intpol_right();
        let left = law.dist_intpol_left();

        assert_relative_eq!(law.outer_blend(right, n), law.exact(right, n), epsilon = 1e-12);
        assert_relative_eq!(law.inner_blend(left, n), law.exact(left, n), epsilon = 1e-12);
        assert_relative_eq!(law.inner_blend(law.smax(), n), law.clamped(n), epsilon = 1e-12);
        assert!(law.outer_blend(law.max_interaction_distance() - 1e-9, n).abs() < 1e-6);
    }

    #[test]
    fn magnitude_regimes() {
        let law = RepulsionLaw::default();
        assert_eq!(law.magnitude(2.0, 1.0), 0.0);
        assert_eq!(law.magnitude(5.0, 1.0), 0.0);
        assert_relative_eq!(law.magnitude(1.0, 1.0), -1.0, epsilon = 1e-12);
        assert_relative_eq!(law.magnitude(0.1, 1.0), -5.0, epsilon = 1e-12);
        assert_relative_eq!(law.magnitude(-0.3, 1.0), -5.0, epsilon = 1e-12);
        // Closer means stronger.
        assert!(law.magnitude(0.5, 1.0) < law.magnitude(1.0, 1.0));
        assert!(law.magnitude(0.45, 1.0) < law.magnitude(0.55, 1.0));
    }
}

#[cfg(test)]
mod profiles {
    use pd_agent::{ModelData, ModelType};
    use pd_core::ParametersId;

    use crate::{
        CollisionFreeSpeedBuilder, CollisionFreeSpeedModel, CollisionFreeSpeedParameters,
        GeneralizedCentrifugalForceModel, GeneralizedCentrifugalForceParameters, ModelError,
        OperationalModel, Violation,
    };

    #[test]
    fn duplicate_profile_rejected() {
        let err = CollisionFreeSpeedModel::builder()
            .add_profile(ParametersId(1), CollisionFreeSpeedParameters::default())
            .add_profile(ParametersId(1), CollisionFreeSpeedParameters::default())
            .build();
        assert!(matches!(err, Err(ModelError::DuplicateProfile(ParametersId(1)))));
    }

    #[test]
    fn unknown_profile_reported() {
        let model = CollisionFreeSpeedModel::builder()
            .add_profile(ParametersId(0), CollisionFreeSpeedParameters::default())
            .build()
            .unwrap();
        assert!(model.validate_parameters_id(ParametersId(0)).is_ok());
        assert!(matches!(
            model.validate_parameters_id(ParametersId(9)),
            Err(ModelError::UnknownProfile(ParametersId(9)))
        ));
    }

    #[test]
    fn out_of_range_profile_rejected_at_build() {
        let bad = CollisionFreeSpeedParameters { radius: 0.0, ..Default::default() };
        let err = CollisionFreeSpeedModel::builder().add_profile(ParametersId(0), bad).build();
        assert!(matches!(
            err,
            Err(ModelError::ConstraintViolation(Violation::ParameterOutOfRange { name: "radius", .. }))
        ));

        let bad = GeneralizedCentrifugalForceParameters { b_min: 0.3, b_max: 0.2, ..Default::default() };
        let err = GeneralizedCentrifugalForceModel::builder().add_profile(ParametersId(0), bad).build();
        assert!(matches!(
            err,
            Err(ModelError::ConstraintViolation(Violation::ParameterOutOfRange { name: "b_max", .. }))
        ));
    }

    #[test]
    fn invalid_model_constants_rejected() {
        let err = CollisionFreeSpeedBuilder::new(8.0, 0.0, 5.0, 0.02).build();
        assert!(matches!(err, Err(ModelError::InvalidConfig(_))));
    }

    #[test]
    fn every_added_profile_is_known() {
        let model = CollisionFreeSpeedModel::builder()
            .add_profile(ParametersId(7), CollisionFreeSpeedParameters::default())
            .add_profile(ParametersId(2), CollisionFreeSpeedParameters::default())
            .build()
            .unwrap();
        assert_eq!(model.profiles().len(), 2);
        assert!(model.profiles().contains(ParametersId(2)));
        assert!(model.profiles().contains(ParametersId(7)));
        assert!(model.validate_parameters_id(ParametersId(3)).is_err());
    }

    #[test]
    fn payload_must_match_model() {
        let model = CollisionFreeSpeedModel::builder().build().unwrap();
        assert!(model.validate_model_data(&ModelData::initial(ModelType::CollisionFreeSpeed)).is_ok());
        assert!(matches!(
            model.validate_model_data(&ModelData::initial(ModelType::Velocity)),
            Err(ModelError::ModelMismatch { expected: ModelType::CollisionFreeSpeed, found: ModelType::Velocity })
        ));
    }
}

#[cfg(test)]
mod collision_free_speed {
    use approx::assert_relative_eq;
    use pd_agent::{ModelData, ModelType};
    use pd_core::{ParametersId, Point};

    use super::fixtures::{DT, agent, floor_wall, index, open_space};
    use crate::{
        CollisionFreeSpeedModel, CollisionFreeSpeedParameters, Model, ModelError, ModelUpdate,
        OperationalModel, Violation,
    };

    fn model() -> CollisionFreeSpeedModel {
        CollisionFreeSpeedModel::builder()
            .add_profile(ParametersId(0), CollisionFreeSpeedParameters::default())
            .build()
            .unwrap()
    }

    #[test]
    fn lone_agent_walks_at_desired_speed() {
        let m = model();
        let me = agent(ModelType::CollisionFreeSpeed, 0, 0.0, 0.0, 10.0);
        let idx = index(std::slice::from_ref(&me));

        let ModelUpdate::CollisionFreeSpeed(u) = m.compute_new_position(DT, &me, &open_space(), &idx) else {
            panic!("expected a collision-free speed update");
        };
        assert_relative_eq!(u.speed, 1.2, epsilon = 1e-12);
        assert_relative_eq!(u.position.x, 0.012, epsilon = 1e-12);
        assert_relative_eq!(u.position.y, 0.0, epsilon = 1e-12);
        assert_eq!(u.orientation, Point::new(1.0, 0.0));
    }

    #[test]
    fn head_on_pair_three_metres_apart() {
        let m = model();
        let agents = vec![
            agent(ModelType::CollisionFreeSpeed, 0, 0.0, 0.0, 10.0),
            agent(ModelType::CollisionFreeSpeed, 1, 3.0, 0.0, -10.0),
        ];
        let idx = index(&agents);

        let ModelUpdate::CollisionFreeSpeed(u) = m.compute_new_position(DT, &agents[0], &open_space(), &idx) else {
            panic!("expected a collision-free speed update");
        };
        // Spacing 3 − 0.4 = 2.6 m exceeds v0·T, so the speed saturates.
        assert_relative_eq!(u.speed, 1.2, epsilon = 1e-9);
        assert_relative_eq!(u.position.x, 1.2 * DT, epsilon = 1e-9);
        assert!(u.position.y.abs() < 1e-9);
    }

    #[test]
    fn close_neighbor_ahead_slows_agent() {
        let m = model();
        let agents = vec![
            agent(ModelType::CollisionFreeSpeed, 0, 0.0, 0.0, 10.0),
            agent(ModelType::CollisionFreeSpeed, 1, 1.0, 0.0, 10.0),
        ];
        let idx = index(&agents);
        let ModelUpdate::CollisionFreeSpeed(u) = m.compute_new_position(DT, &agents[0], &open_space(), &idx) else {
            panic!("expected a collision-free speed update");
        };
        // Repulsion along the axis keeps the direction; spacing 0.6 m.
        assert_relative_eq!(u.speed, 0.6, epsilon = 1e-9);
    }

    #[test]
    fn apply_writes_back_state() {
        let m = model();
        let mut me = agent(ModelType::CollisionFreeSpeed, 0, 0.0, 0.0, 10.0);
        let idx = index(std::slice::from_ref(&me));
        let update = m.compute_new_position(DT, &me, &open_space(), &idx);
        m.apply_update(update, &mut me);
        assert_relative_eq!(me.pos.x, 0.012, epsilon = 1e-12);
        assert!(matches!(me.model, ModelData::CollisionFreeSpeed(d) if (d.speed - 1.2).abs() < 1e-12));
    }

    #[test]
    fn foreign_payload_holds_position() {
        let m = model();
        let mut me = agent(ModelType::Velocity, 0, 0.0, 0.0, 10.0);
        let before = me.clone();
        let idx = index(std::slice::from_ref(&me));
        let update = m.compute_new_position(DT, &me, &open_space(), &idx);
        assert_eq!(update, ModelUpdate::Hold);
        m.apply_update(update, &mut me);
        assert_eq!(me, before);
    }

    #[test]
    fn overlapping_agents_violate_constraint() {
        let m = model();
        let agents = vec![
            agent(ModelType::CollisionFreeSpeed, 0, 0.0, 0.0, 10.0),
            agent(ModelType::CollisionFreeSpeed, 1, 0.3, 0.0, 10.0),
        ];
        let idx = index(&agents);
        let err = m.check_model_constraint(&agents[0], &idx, &open_space());
        assert!(matches!(
            err,
            Err(ModelError::ConstraintViolation(Violation::TooCloseToAgent { neighbor, .. })) if neighbor.0 == 1
        ));
    }

    #[test]
    fn agent_inside_wall_violates_constraint() {
        let m = model();
        let me = agent(ModelType::CollisionFreeSpeed, 0, 0.0, 0.1, 10.0);
        let idx = index(std::slice::from_ref(&me));
        let err = m.check_model_constraint(&me, &idx, &floor_wall());
        assert!(matches!(err, Err(ModelError::ConstraintViolation(Violation::TooCloseToWall { .. }))));

        let clear = agent(ModelType::CollisionFreeSpeed, 0, 0.0, 0.5, 10.0);
        let idx = index(std::slice::from_ref(&clear));
        assert!(m.check_model_constraint(&clear, &idx, &floor_wall()).is_ok());
    }

    #[test]
    fn wall_pushes_agent_away() {
        let m = model();
        let me = agent(ModelType::CollisionFreeSpeed, 0, 0.0, 0.25, 10.0);
        let idx = index(std::slice::from_ref(&me));
        let ModelUpdate::CollisionFreeSpeed(u) = m.compute_new_position(DT, &me, &floor_wall(), &idx) else {
            panic!("expected a collision-free speed update");
        };
        assert!(u.orientation.y > 0.0);
    }

    #[test]
    fn enum_dispatches_to_variant() {
        let m: Model = model().into();
        assert_eq!(m.model_type(), ModelType::CollisionFreeSpeed);
        let me = agent(ModelType::CollisionFreeSpeed, 0, 0.0, 0.0, 10.0);
        let idx = index(std::slice::from_ref(&me));
        assert_eq!(
            m.compute_new_position(DT, &me, &open_space(), &idx),
            model().compute_new_position(DT, &me, &open_space(), &idx)
        );
    }
}

#[cfg(test)]
mod velocity {
    use approx::assert_relative_eq;
    use pd_agent::{AgentBuilder, ModelData, ModelType};
    use pd_core::{AgentId, ParametersId, Point};

    use super::fixtures::{DT, agent, index, open_space};
    use crate::{ModelUpdate, OperationalModel, VelocityModel, VelocityParameters};

    fn model() -> VelocityModel {
        VelocityModel::builder().add_profile(ParametersId(0), VelocityParameters::default()).build().unwrap()
    }

    #[test]
    fn initialize_seeds_heading() {
        let m = model();
        let mut me = AgentBuilder::new(AgentId(0), ModelType::Velocity)
            .destination(Point::new(0.0, 5.0))
            .build();
        m.initialize_agent(&mut me);
        assert_eq!(me.orientation, Point::new(0.0, 1.0));
        assert!(matches!(me.model, ModelData::Velocity(d) if d.e0 == Point::new(0.0, 1.0)));
    }

    #[test]
    fn lone_agent_walks_and_counts_turning_delay() {
        let m = model();
        let mut me = agent(ModelType::Velocity, 0, 0.0, 0.0, 10.0);
        m.initialize_agent(&mut me);
        let idx = index(std::slice::from_ref(&me));

        let update = m.compute_new_position(DT, &me, &open_space(), &idx);
        let ModelUpdate::Velocity(u) = update else { panic!("expected a velocity update") };
        assert_relative_eq!(u.speed, 1.2, epsilon = 1e-12);
        assert_relative_eq!(u.position.x, 0.012, epsilon = 1e-12);
        assert!(!u.reset_turning);

        m.apply_update(update, &mut me);
        assert!(matches!(me.model, ModelData::Velocity(d) if d.orientation_delay == 1));
    }

    #[test]
    fn arrival_resets_turning_delay() {
        let m = model();
        let mut me = agent(ModelType::Velocity, 0, 0.0, 0.0, 0.0);
        if let ModelData::Velocity(d) = &mut me.model {
            d.e0 = Point::new(1.0, 0.0);
            d.orientation_delay = 40;
        }
        let idx = index(std::slice::from_ref(&me));
        let update = m.compute_new_position(DT, &me, &open_space(), &idx);
        let ModelUpdate::Velocity(u) = update else { panic!("expected a velocity update") };
        assert!(u.reset_turning);
        assert_eq!(u.e0, Point::new(1.0, 0.0));

        m.apply_update(update, &mut me);
        assert!(matches!(me.model, ModelData::Velocity(d) if d.orientation_delay == 0));
    }

    #[test]
    fn heading_lags_behind_a_turn() {
        let m = model();
        let mut me = agent(ModelType::Velocity, 0, 0.0, 0.0, 10.0);
        // Destination moved to +y while the agent was heading along +x.
        me.destination = Point::new(0.0, 10.0);
        if let ModelData::Velocity(d) = &mut me.model {
            d.e0 = Point::new(1.0, 0.0);
            d.orientation_delay = 5;
        }
        let idx = index(std::slice::from_ref(&me));
        let ModelUpdate::Velocity(u) = m.compute_new_position(DT, &me, &open_space(), &idx) else {
            panic!("expected a velocity update");
        };
        assert!(u.e0.x > 0.0 && u.e0.y > 0.0);
        assert!(u.e0.x > u.e0.y);
    }
}

#[cfg(test)]
mod gcfm {
    use approx::assert_relative_eq;
    use pd_agent::{GenericAgent, ModelData, ModelType};
    use pd_core::{ParametersId, Point};

    use super::fixtures::{DT, agent, floor_wall, index, open_space};
    use crate::{
        GeneralizedCentrifugalForceModel, GeneralizedCentrifugalForceParameters, ModelError, ModelUpdate,
        OperationalModel, Violation,
    };

    fn model() -> GeneralizedCentrifugalForceModel {
        GeneralizedCentrifugalForceModel::builder()
            .add_profile(ParametersId(0), GeneralizedCentrifugalForceParameters::default())
            .build()
            .unwrap()
    }

    #[test]
    fn agent_at_rest_accelerates_toward_destination() {
        let m = model();
        let mut me = agent(ModelType::GeneralizedCentrifugalForce, 0, 0.0, 0.0, 10.0);
        m.initialize_agent(&mut me);
        let idx = index(std::slice::from_ref(&me));

        let update = m.compute_new_position(DT, &me, &open_space(), &idx);
        let ModelUpdate::GeneralizedCentrifugalForce(u) = update else {
            panic!("expected a GCFM update");
        };
        // a = v0 / tau = 2.4 m/s²
        assert_relative_eq!(u.velocity.x, 0.024, epsilon = 1e-12);
        assert_relative_eq!(u.position.x, 0.000_24, epsilon = 1e-12);

        m.apply_update(update, &mut me);
        let ModelData::GeneralizedCentrifugalForce(d) = me.model else { panic!("payload changed") };
        assert_relative_eq!(d.speed, 0.024, epsilon = 1e-12);
        assert_eq!(d.orientation_delay, 1);
        assert_eq!(me.orientation, Point::new(1.0, 0.0));
    }

    #[test]
    fn neighbor_ahead_brakes() {
        let m = model();
        let mut agents = vec![
            agent(ModelType::GeneralizedCentrifugalForce, 0, 0.0, 0.0, 10.0),
            agent(ModelType::GeneralizedCentrifugalForce, 1, 1.2, 0.0, 10.0),
        ];
        for a in &mut agents {
            m.initialize_agent(a);
            if let ModelData::GeneralizedCentrifugalForce(d) = &mut a.model {
                d.speed = 1.0;
            }
        }
        let idx = index(&agents);
        let alone = index(&agents[..1]);

        let ModelUpdate::GeneralizedCentrifugalForce(crowded) =
            m.compute_new_position(DT, &agents[0], &open_space(), &idx)
        else {
            panic!("expected a GCFM update");
        };
        let ModelUpdate::GeneralizedCentrifugalForce(free) =
            m.compute_new_position(DT, &agents[0], &open_space(), &alone)
        else {
            panic!("expected a GCFM update");
        };
        assert!(crowded.velocity.x < free.velocity.x);
    }

    #[test]
    fn overlapping_ellipses_violate_constraint() {
        let m = model();
        let agents = vec![
            agent(ModelType::GeneralizedCentrifugalForce, 0, 0.0, 0.0, 10.0),
            agent(ModelType::GeneralizedCentrifugalForce, 1, 0.3, 0.0, 10.0),
        ];
        let idx = index(&agents);
        assert!(matches!(
            m.check_model_constraint(&agents[0], &idx, &open_space()),
            Err(ModelError::ConstraintViolation(Violation::TooCloseToAgent { .. }))
        ));

        let apart = vec![
            agent(ModelType::GeneralizedCentrifugalForce, 0, 0.0, 0.0, 10.0),
            agent(ModelType::GeneralizedCentrifugalForce, 1, 1.5, 0.0, 10.0),
        ];
        let idx = index(&apart);
        assert!(m.check_model_constraint(&apart[0], &idx, &open_space()).is_ok());
        assert!(m.agent_spacing(&apart[0], &apart[1]).is_some_and(|d| d > 0.0));
    }

    /// Initialised GCFM agent on y = 0 facing +x at `speed`.
    fn walking(m: &GeneralizedCentrifugalForceModel, id: u64, x: f64, speed: f64) -> GenericAgent {
        let mut a = agent(ModelType::GeneralizedCentrifugalForce, id, x, 0.0, 10.0);
        m.initialize_agent(&mut a);
        if let ModelData::GeneralizedCentrifugalForce(d) = &mut a.model {
            d.speed = speed;
        }
        a
    }

    /// Velocity of agent 0 after one step among `agents`.
    fn next_velocity(m: &GeneralizedCentrifugalForceModel, agents: &[GenericAgent]) -> Point {
        let idx = index(agents);
        let ModelUpdate::GeneralizedCentrifugalForce(u) = m.compute_new_position(DT, &agents[0], &open_space(), &idx)
        else {
            panic!("expected a GCFM update");
        };
        u.velocity
    }

    #[test]
    fn neighbor_behind_exerts_no_force() {
        let m = model();
        let me = walking(&m, 0, 0.0, 1.0);
        let free = next_velocity(&m, std::slice::from_ref(&me));
        // Relaxation only: 1.0 + (1.2 − 1.0) / 0.5 · dt.
        assert_relative_eq!(free.x, 1.004, epsilon = 1e-12);

        let behind = next_velocity(&m, &[me, walking(&m, 1, -1.5, 0.0)]);
        assert_relative_eq!(behind.x, free.x, epsilon = 1e-12);
        assert_relative_eq!(behind.y, free.y, epsilon = 1e-12);
    }

    #[test]
    fn coincident_neighbor_is_skipped() {
        let m = model();
        let me = walking(&m, 0, 0.0, 1.0);
        let free = next_velocity(&m, std::slice::from_ref(&me));
        let stacked = next_velocity(&m, &[me, walking(&m, 1, 0.000_5, 0.0)]);
        assert_relative_eq!(stacked.x, free.x, epsilon = 1e-12);
        assert_relative_eq!(stacked.y, free.y, epsilon = 1e-12);
    }

    #[test]
    fn repulsion_is_clamped_near_contact() {
        // At 1 m/s the agent's ellipse reaches 1.2 m ahead and the resting
        // neighbor's 0.2 m back, so both placements sit below smax = 0.4 m
        // of effective distance.
        let m = model();
        let me = walking(&m, 0, 0.0, 1.0);
        let near = next_velocity(&m, &[me.clone(), walking(&m, 1, 1.45, 0.0)]);
        let nearer = next_velocity(&m, &[me, walking(&m, 1, 1.6, 0.0)]);
        assert_relative_eq!(near.x, nearer.x, epsilon = 1e-12);

        // n = mass · k · (ν·v0 + v_rel)² = 1.36², clamp = 3 · n / 0.6.
        let clamp = 3.0 * 1.36 * 1.36 / 0.6;
        assert_relative_eq!(near.x, 1.0 + (0.4 - clamp) * DT, epsilon = 1e-9);
        assert_relative_eq!(near.y, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn wall_clearance_is_half_the_resting_body() {
        let m = model();
        assert_relative_eq!(GeneralizedCentrifugalForceParameters::default().wall_clearance(), 0.2);

        let clear = agent(ModelType::GeneralizedCentrifugalForce, 0, 0.0, 0.3, 10.0);
        let idx = index(std::slice::from_ref(&clear));
        assert!(m.check_model_constraint(&clear, &idx, &floor_wall()).is_ok());

        let touching = agent(ModelType::GeneralizedCentrifugalForce, 0, 0.0, 0.15, 10.0);
        let idx = index(std::slice::from_ref(&touching));
        assert!(matches!(
            m.check_model_constraint(&touching, &idx, &floor_wall()),
            Err(ModelError::ConstraintViolation(Violation::TooCloseToWall { .. }))
        ));
    }
}

#[cfg(test)]
mod social_force {
    use approx::assert_relative_eq;
    use pd_agent::{ModelData, ModelType};
    use pd_core::{ParametersId, Point};

    use super::fixtures::{DT, agent, floor_wall, index, open_space};
    use crate::{ModelUpdate, OperationalModel, SocialForceModel, SocialForceParameters};

    fn model() -> SocialForceModel {
        SocialForceModel::builder().add_profile(ParametersId(0), SocialForceParameters::default()).build().unwrap()
    }

    #[test]
    fn agent_at_rest_accelerates_toward_destination() {
        let m = model();
        let mut me = agent(ModelType::SocialForce, 0, 0.0, 0.0, 10.0);
        let idx = index(std::slice::from_ref(&me));

        let update = m.compute_new_position(DT, &me, &open_space(), &idx);
        let ModelUpdate::SocialForce(u) = update else { panic!("expected a social force update") };
        // a = desired_speed / reaction_time = 1.6 m/s²
        assert_relative_eq!(u.velocity.x, 0.016, epsilon = 1e-12);
        assert_relative_eq!(u.position.x, 0.000_16, epsilon = 1e-12);

        m.apply_update(update, &mut me);
        assert!(matches!(me.model, ModelData::SocialForce(d) if (d.velocity.x - 0.016).abs() < 1e-12));
        assert_eq!(me.orientation, Point::new(1.0, 0.0));
    }

    #[test]
    fn wall_pushes_agent_away() {
        let m = model();
        let me = agent(ModelType::SocialForce, 0, 0.0, 0.35, 10.0);
        let idx = index(std::slice::from_ref(&me));
        let ModelUpdate::SocialForce(u) = m.compute_new_position(DT, &me, &floor_wall(), &idx) else {
            panic!("expected a social force update");
        };
        assert!(u.velocity.y > 0.0);
    }

    #[test]
    fn neighbors_push_apart() {
        let m = model();
        let agents = vec![
            agent(ModelType::SocialForce, 0, 0.0, 0.0, 0.0),
            agent(ModelType::SocialForce, 1, 0.7, 0.0, 0.7),
        ];
        let idx = index(&agents);
        let ModelUpdate::SocialForce(u) = m.compute_new_position(DT, &agents[0], &open_space(), &idx) else {
            panic!("expected a social force update");
        };
        assert!(u.velocity.x < 0.0);
    }
}

#[cfg(test)]
mod anticipation_velocity {
    use approx::assert_relative_eq;
    use pd_agent::{ModelData, ModelType};
    use pd_core::{AgentId, ParametersId, Point, TieBreakRng};

    use super::fixtures::{DT, agent, index, open_space};
    use crate::{AnticipationVelocityModel, AnticipationVelocityParameters, ModelUpdate, OperationalModel};

    fn model(seed: u64) -> AnticipationVelocityModel {
        AnticipationVelocityModel::builder()
            .seed(seed)
            .add_profile(ParametersId(0), AnticipationVelocityParameters::default())
            .build()
            .unwrap()
    }

    #[test]
    fn lone_agent_walks_at_desired_speed() {
        let m = model(1);
        let mut me = agent(ModelType::AnticipationVelocity, 0, 0.0, 0.0, 10.0);
        let idx = index(std::slice::from_ref(&me));

        let update = m.compute_new_position(DT, &me, &open_space(), &idx);
        let ModelUpdate::AnticipationVelocity(u) = update else { panic!("expected an anticipation update") };
        assert_relative_eq!(u.velocity.x, 1.2, epsilon = 1e-12);
        assert_relative_eq!(u.position.x, 0.012, epsilon = 1e-12);

        m.apply_update(update, &mut me);
        let ModelData::AnticipationVelocity(d) = me.model else { panic!("payload changed") };
        assert_eq!(d.tie_break_epoch, 1);
        assert_relative_eq!(d.velocity.x, 1.2, epsilon = 1e-12);
    }

    #[test]
    fn influence_points_away_from_predicted_side() {
        let mut rng = TieBreakRng::new(0, AgentId(0), 0);
        let desired = Point::new(1.0, 0.0);
        let left = AnticipationVelocityModel::influence_direction(desired, Point::new(1.0, 0.5), &mut rng);
        assert_eq!(left, Point::new(0.0, -1.0));
        let right = AnticipationVelocityModel::influence_direction(desired, Point::new(1.0, -0.5), &mut rng);
        assert_eq!(right, Point::new(0.0, 1.0));
        let tie = AnticipationVelocityModel::influence_direction(desired, Point::new(1.0, 0.0), &mut rng);
        assert_relative_eq!(tie.y.abs(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn direction_turns_with_lag() {
        let mut me = agent(ModelType::AnticipationVelocity, 0, 0.0, 0.0, 10.0);
        me.orientation = Point::new(0.0, 1.0).normalized();
        me.destination = Point::new(10.0, 10.0);
        let d = AnticipationVelocityModel::smooth_direction(&me, Point::new(1.0, 0.0), 0.3, DT);
        assert!(d.is_unit_length(1e-12));
        assert!(d.y > d.x && d.x > 0.0);
    }

    #[test]
    fn clone_reproduces_tie_breaks() {
        let m = model(7);
        let fork = m.clone();
        let agents = vec![
            agent(ModelType::AnticipationVelocity, 0, 0.0, 0.0, 10.0),
            agent(ModelType::AnticipationVelocity, 1, 1.0, 0.0, -10.0),
        ];
        let idx = index(&agents);
        for a in &agents {
            assert_eq!(
                m.compute_new_position(DT, a, &open_space(), &idx),
                fork.compute_new_position(DT, a, &open_space(), &idx)
            );
        }
    }

    #[test]
    fn head_on_pair_sidesteps() {
        let m = model(3);
        let agents = vec![
            agent(ModelType::AnticipationVelocity, 0, 0.0, 0.0, 10.0),
            agent(ModelType::AnticipationVelocity, 1, 1.0, 0.0, -10.0),
        ];
        let idx = index(&agents);
        let ModelUpdate::AnticipationVelocity(u) = m.compute_new_position(DT, &agents[0], &open_space(), &idx)
        else {
            panic!("expected an anticipation update");
        };
        assert!(u.orientation.y.abs() > 0.0);
        assert!(u.orientation.is_unit_length(1e-9));
    }
}
