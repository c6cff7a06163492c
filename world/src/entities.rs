use std::time::Duration;

use glam::Vec2;
use netbattle_core::{
    in_flight_bounds, AttackStyle, EnemyId, EnemySpawn, Heading, ImpactId, NaviStats, OnHit,
    ProjectileId, Side, SlashTint, SplashShape, TileCoord,
};

/// Tile the Navi occupies when a battle starts.
pub(crate) const NAVI_START: TileCoord = TileCoord::new(1, 1);

/// Player-side combatant.
#[derive(Clone, Debug)]
pub(crate) struct Navi {
    pub(crate) stats: NaviStats,
    pub(crate) tile: TileCoord,
    pub(crate) invisibility: Duration,
}

impl Navi {
    pub(crate) fn new(stats: NaviStats) -> Self {
        Self {
            stats,
            tile: NAVI_START,
            invisibility: Duration::ZERO,
        }
    }

    pub(crate) fn is_invisible(&self) -> bool {
        !self.invisibility.is_zero()
    }
}

/// Virus-side combatant. Deleted enemies stay in the list with `alive` cleared.
#[derive(Clone, Debug)]
pub(crate) struct Enemy {
    pub(crate) id: EnemyId,
    pub(crate) name: String,
    pub(crate) tile: TileCoord,
    pub(crate) hp: i32,
    pub(crate) max_hp: i32,
    pub(crate) attack: i32,
    pub(crate) defense: i32,
    pub(crate) is_boss: bool,
    pub(crate) alive: bool,
    pub(crate) attack_style: AttackStyle,
    pub(crate) attack_lock: Duration,
    pub(crate) lock_remaining: Duration,
    pub(crate) move_timer: Option<Duration>,
    pub(crate) attack_timer: Option<Duration>,
}

impl Enemy {
    pub(crate) fn from_spawn(id: EnemyId, spawn: EnemySpawn) -> Self {
        let max_hp = spawn.hp.max(0);
        Self {
            id,
            name: spawn.name,
            tile: spawn.tile.clamp_to(Side::Virus),
            hp: max_hp,
            max_hp,
            attack: spawn.attack,
            defense: spawn.defense,
            is_boss: spawn.is_boss,
            alive: max_hp > 0,
            attack_style: spawn.attack_style,
            attack_lock: spawn.attack_lock,
            lock_remaining: Duration::ZERO,
            move_timer: Some(spawn.move_in),
            attack_timer: Some(spawn.attack_in),
        }
    }

    pub(crate) fn is_locked(&self) -> bool {
        !self.lock_remaining.is_zero()
    }
}

/// Counts an armed timer down, disarming it and reporting `true` once it elapses.
pub(crate) fn countdown(timer: &mut Option<Duration>, dt: Duration) -> bool {
    let Some(remaining) = timer.as_mut() else {
        return false;
    };
    *remaining = remaining.saturating_sub(dt);
    if remaining.is_zero() {
        *timer = None;
        return true;
    }
    false
}

#[derive(Clone, Debug)]
pub(crate) struct Projectile {
    pub(crate) id: ProjectileId,
    pub(crate) position: Vec2,
    pub(crate) heading: Heading,
    pub(crate) damage: i32,
    pub(crate) owner: Side,
    pub(crate) speed: f32,
    pub(crate) pierce: bool,
    pub(crate) hit_radius: f32,
    pub(crate) on_hit: OnHit,
    pub(crate) shockwave: bool,
    pub(crate) alive: bool,
}

impl Projectile {
    /// Moves the projectile and reports whether it just left the flight envelope.
    pub(crate) fn advance(&mut self, dt: Duration) -> bool {
        if !self.alive {
            return false;
        }
        self.position += self.heading.vector() * self.speed * dt.as_secs_f32();
        if in_flight_bounds(self.position) {
            return false;
        }
        self.alive = false;
        true
    }

    /// Box test against a combatant standing on `tile`.
    pub(crate) fn overlaps(&self, tile: TileCoord) -> bool {
        let delta = (self.position - tile.point()).abs();
        delta.x < self.hit_radius && delta.y < self.hit_radius
    }
}

#[derive(Clone, Debug)]
pub(crate) struct Impact {
    pub(crate) id: ImpactId,
    pub(crate) target: TileCoord,
    pub(crate) damage: i32,
    pub(crate) delay_remaining: Duration,
    pub(crate) splash: SplashShape,
    pub(crate) owner: Side,
    pub(crate) alive: bool,
}

impl Impact {
    pub(crate) fn countdown(&mut self, dt: Duration) {
        if self.alive {
            self.delay_remaining = self.delay_remaining.saturating_sub(dt);
        }
    }

    pub(crate) fn is_due(&self) -> bool {
        self.alive && self.delay_remaining.is_zero()
    }

    /// In-bounds footprint tiles.
    pub(crate) fn tiles(&self) -> Vec<TileCoord> {
        self.splash
            .footprint(self.target)
            .into_iter()
            .filter(|tile| tile.in_bounds())
            .collect()
    }
}

#[derive(Clone, Debug)]
pub(crate) struct Slash {
    pub(crate) tiles: Vec<TileCoord>,
    pub(crate) tint: SlashTint,
    pub(crate) remaining: Duration,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shot(position: Vec2, heading: Heading) -> Projectile {
        Projectile {
            id: ProjectileId::new(0),
            position,
            heading,
            damage: 1,
            owner: Side::Navi,
            speed: 8.0,
            pierce: false,
            hit_radius: 0.6,
            on_hit: OnHit::None,
            shockwave: false,
            alive: true,
        }
    }

    #[test]
    fn projectile_dies_after_leaving_envelope() {
        let mut projectile = shot(Vec2::new(5.5, 1.0), Heading::EAST);
        assert!(!projectile.advance(Duration::from_millis(50)));
        assert!(projectile.advance(Duration::from_millis(200)));
        assert!(!projectile.alive);
        assert!(!projectile.advance(Duration::from_millis(200)));
    }

    #[test]
    fn hit_test_uses_a_box() {
        let projectile = shot(Vec2::new(3.5, 1.5), Heading::EAST);
        assert!(projectile.overlaps(TileCoord::new(4, 2)));
        assert!(projectile.overlaps(TileCoord::new(3, 1)));
        assert!(!projectile.overlaps(TileCoord::new(5, 1)));
    }

    #[test]
    fn timers_elapse_once() {
        let mut timer = Some(Duration::from_millis(100));
        assert!(!countdown(&mut timer, Duration::from_millis(60)));
        assert!(countdown(&mut timer, Duration::from_millis(60)));
        assert_eq!(timer, None);
        assert!(!countdown(&mut timer, Duration::from_millis(60)));
    }

    #[test]
    fn spawned_enemies_are_clamped_to_their_side() {
        let spawn = EnemySpawn::new("Mettaur", 40, 10, 2, TileCoord::new(1, 5));
        let enemy = Enemy::from_spawn(EnemyId::new(0), spawn);
        assert_eq!(enemy.tile, TileCoord::new(3, 2));
        assert!(enemy.alive);
    }
}
