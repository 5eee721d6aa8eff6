use nalgebra::Vector3;
use rapier3d::prelude::*;

use super::body::{CharacterBody, ForceMode, Orientation, PhysicsError};
use super::constants::physics as consts;

// Collision groups: the character collides with static geometry only.
const GROUP_STATIC: Group = Group::GROUP_1;
const GROUP_CHARACTER: Group = Group::GROUP_2;

/// Rapier handles and look state for the controlled character body.
pub struct CharacterBodyState {
    pub body_handle: RigidBodyHandle,
    pub collider_handle: ColliderHandle,
    /// Collider extents at unit scale
    pub base_size: [f32; 3],
    pub scale: Vector3<f32>,
    pub mass: f32,
    pub yaw: f32,
}

/// Wrapper around a Rapier3D world holding static level geometry and one
/// dynamic character body.
pub struct PhysicsWorld {
    pub gravity: Vector<Real>,
    pub rigid_body_set: RigidBodySet,
    pub collider_set: ColliderSet,
    pub integration_parameters: IntegrationParameters,
    pub physics_pipeline: PhysicsPipeline,
    pub island_manager: IslandManager,
    pub broad_phase: DefaultBroadPhase,
    pub narrow_phase: NarrowPhase,
    pub impulse_joint_set: ImpulseJointSet,
    pub multibody_joint_set: MultibodyJointSet,
    pub ccd_solver: CCDSolver,
    pub query_pipeline: QueryPipeline,

    pub character: Option<CharacterBodyState>,
}

/// Builds the character's box collider for a given unit size and scale.
fn build_character_collider(base_size: [f32; 3], scale: Vector3<f32>, mass: f32) -> Collider {
    let [sx, sy, sz] = base_size;
    ColliderBuilder::cuboid(sx * scale.x / 2.0, sy * scale.y / 2.0, sz * scale.z / 2.0)
        .mass(mass)
        .friction(0.0)
        .friction_combine_rule(CoefficientCombineRule::Min)
        .collision_groups(InteractionGroups::new(GROUP_CHARACTER, GROUP_STATIC))
        .build()
}

impl PhysicsWorld {
    /// Creates a new physics world with default gravity
    pub fn new() -> Self {
        Self {
            gravity: vector![0.0, -consts::DEFAULT_GRAVITY, 0.0],
            rigid_body_set: RigidBodySet::new(),
            collider_set: ColliderSet::new(),
            integration_parameters: IntegrationParameters::default(),
            physics_pipeline: PhysicsPipeline::new(),
            island_manager: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            impulse_joint_set: ImpulseJointSet::new(),
            multibody_joint_set: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            query_pipeline: QueryPipeline::new(),
            character: None,
        }
    }

    /// Steps the physics simulation forward by dt seconds
    pub fn step(&mut self, dt: f32) {
        self.integration_parameters.dt = dt;
        self.physics_pipeline.step(
            &self.gravity,
            &self.integration_parameters,
            &mut self.island_manager,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.rigid_body_set,
            &mut self.collider_set,
            &mut self.impulse_joint_set,
            &mut self.multibody_joint_set,
            &mut self.ccd_solver,
            Some(&mut self.query_pipeline),
            &(),
            &(),
        );
    }

    /// Clears the continuous forces of the previous fixed step.
    pub fn reset_character_forces(&mut self) {
        if let Some(body) = self
            .character
            .as_ref()
            .and_then(|c| self.rigid_body_set.get_mut(c.body_handle))
        {
            body.reset_forces(true);
        }
    }

    /// Adds an immovable box (floor, wall, ceiling) centered at `center`.
    pub fn add_static_box(&mut self, center: [f32; 3], size: [f32; 3]) -> ColliderHandle {
        let [sx, sy, sz] = size;
        let collider = ColliderBuilder::cuboid(sx / 2.0, sy / 2.0, sz / 2.0)
            .translation(vector![center[0], center[1], center[2]])
            .collision_groups(InteractionGroups::new(GROUP_STATIC, Group::ALL))
            .build();
        let handle = self.collider_set.insert(collider);
        self.query_pipeline.update(&self.collider_set);
        handle
    }

    /// Removes a static box added with [`PhysicsWorld::add_static_box`].
    pub fn remove_static_box(&mut self, handle: ColliderHandle) -> bool {
        let removed = self
            .collider_set
            .remove(
                handle,
                &mut self.island_manager,
                &mut self.rigid_body_set,
                false,
            )
            .is_some();
        self.query_pipeline.update(&self.collider_set);
        removed
    }

    /// Spawns the character body. Rotations are locked; look direction is
    /// carried separately as a yaw.
    pub fn add_character(&mut self, position: [f32; 3], size: [f32; 3], mass: f32) -> RigidBodyHandle {
        if let Some(existing) = self.character.take() {
            self.rigid_body_set.remove(
                existing.body_handle,
                &mut self.island_manager,
                &mut self.collider_set,
                &mut self.impulse_joint_set,
                &mut self.multibody_joint_set,
                true,
            );
        }

        let body = RigidBodyBuilder::dynamic()
            .translation(vector![position[0], position[1], position[2]])
            .lock_rotations()
            .ccd_enabled(true)
            .build();
        let body_handle = self.rigid_body_set.insert(body);

        let scale = Vector3::new(1.0, 1.0, 1.0);
        let collider = build_character_collider(size, scale, mass);
        let collider_handle = self
            .collider_set
            .insert_with_parent(collider, body_handle, &mut self.rigid_body_set);
        self.query_pipeline.update(&self.collider_set);

        self.character = Some(CharacterBodyState {
            body_handle,
            collider_handle,
            base_size: size,
            scale,
            mass,
            yaw: 0.0,
        });
        body_handle
    }

    pub fn set_character_yaw(&mut self, yaw: f32) {
        if let Some(state) = self.character.as_mut() {
            state.yaw = yaw;
        }
    }

    /// Gets the position of the character body
    pub fn get_character_position(&self) -> Option<[f32; 3]> {
        let state = self.character.as_ref()?;
        self.rigid_body_set.get(state.body_handle).map(|body| {
            let pos = body.translation();
            [pos.x, pos.y, pos.z]
        })
    }

    /// Gets the velocity of the character body
    pub fn get_character_velocity(&self) -> Option<[f32; 3]> {
        let state = self.character.as_ref()?;
        self.rigid_body_set.get(state.body_handle).map(|body| {
            let vel = body.linvel();
            [vel.x, vel.y, vel.z]
        })
    }

    /// Casts a ray and returns the hit distance, ignoring the character body.
    pub fn raycast(
        &self,
        origin: [f32; 3],
        direction: [f32; 3],
        max_distance: f32,
    ) -> Result<Option<f32>, PhysicsError> {
        let dir = vector![direction[0], direction[1], direction[2]];
        let length = dir.norm();
        if length <= consts::EPSILON {
            return Err(PhysicsError::DegenerateRay);
        }
        let ray = Ray::new(point![origin[0], origin[1], origin[2]], dir / length);

        let filter = match &self.character {
            Some(state) => {
                if self.rigid_body_set.get(state.body_handle).is_none() {
                    return Err(PhysicsError::MissingBody);
                }
                QueryFilter::default()
                    .exclude_rigid_body(state.body_handle)
                    .exclude_sensors()
            }
            None => QueryFilter::default().exclude_sensors(),
        };

        Ok(self
            .query_pipeline
            .cast_ray(
                &self.rigid_body_set,
                &self.collider_set,
                &ray,
                max_distance,
                true,
                filter,
            )
            .map(|(_, toi)| toi))
    }

    /// Rebuilds the character collider at a new scale, keeping its mass.
    pub fn set_character_scale(&mut self, scale: Vector3<f32>) -> Result<(), PhysicsError> {
        let state = self.character.as_mut().ok_or(PhysicsError::MissingBody)?;
        if self.rigid_body_set.get(state.body_handle).is_none() {
            return Err(PhysicsError::MissingBody);
        }
        self.collider_set
            .remove(
                state.collider_handle,
                &mut self.island_manager,
                &mut self.rigid_body_set,
                true,
            )
            .ok_or(PhysicsError::MissingCollider)?;

        let collider = build_character_collider(state.base_size, scale, state.mass);
        state.collider_handle = self.collider_set.insert_with_parent(
            collider,
            state.body_handle,
            &mut self.rigid_body_set,
        );
        state.scale = scale;
        self.query_pipeline.update(&self.collider_set);
        Ok(())
    }

    fn character_body(&self) -> Option<&RigidBody> {
        let state = self.character.as_ref()?;
        self.rigid_body_set.get(state.body_handle)
    }

    fn character_body_mut(&mut self) -> Option<&mut RigidBody> {
        let state = self.character.as_ref()?;
        self.rigid_body_set.get_mut(state.body_handle)
    }
}

impl Default for PhysicsWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl CharacterBody for PhysicsWorld {
    fn cast_ray(
        &self,
        origin: Vector3<f32>,
        direction: Vector3<f32>,
        max_distance: f32,
    ) -> Result<bool, PhysicsError> {
        if self.character.is_none() {
            return Err(PhysicsError::MissingBody);
        }
        self.raycast(
            [origin.x, origin.y, origin.z],
            [direction.x, direction.y, direction.z],
            max_distance,
        )
        .map(|hit| hit.is_some())
    }

    fn apply_force(&mut self, force: Vector3<f32>, mode: ForceMode) {
        let Some(body) = self.character_body_mut() else {
            return;
        };
        match mode {
            ForceMode::Force => body.add_force(force, true),
            ForceMode::Impulse => body.apply_impulse(force, true),
            ForceMode::VelocityChange => {
                let v = *body.linvel() + force;
                body.set_linvel(v, true);
            }
        }
    }

    fn linear_velocity(&self) -> Vector3<f32> {
        self.character_body()
            .map(|body| *body.linvel())
            .unwrap_or_else(Vector3::zeros)
    }

    fn set_linear_velocity(&mut self, velocity: Vector3<f32>) {
        if let Some(body) = self.character_body_mut() {
            body.set_linvel(velocity, true);
        }
    }

    fn set_drag(&mut self, drag: f32) {
        if let Some(body) = self.character_body_mut() {
            body.set_linear_damping(drag);
        }
    }

    fn gravity(&self) -> Vector3<f32> {
        self.gravity
    }

    fn mass(&self) -> f32 {
        self.character.as_ref().map(|c| c.mass).unwrap_or(0.0)
    }

    fn position(&self) -> Vector3<f32> {
        self.character_body()
            .map(|body| *body.translation())
            .unwrap_or_else(Vector3::zeros)
    }

    fn orientation(&self) -> Orientation {
        self.character
            .as_ref()
            .map(|c| Orientation::from_yaw(c.yaw))
            .unwrap_or_default()
    }

    fn set_local_scale(&mut self, scale: Vector3<f32>) {
        if let Err(e) = self.set_character_scale(scale) {
            tracing::warn!(error = %e, "failed to rescale character collider");
        }
    }
}
