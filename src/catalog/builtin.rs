//! Stock content tables

use super::{
    Archetype, EffectKind, EvolutionDefinition, EvolutionRule, PassiveDefinition, TierStats,
    WeaponDefinition,
};

// Chainable setters, only used to keep the tables below readable
impl TierStats {
    fn damage(mut self, v: f32) -> Self {
        self.damage = Some(v);
        self
    }
    fn dps(mut self, v: f32) -> Self {
        self.dps = Some(v);
        self
    }
    fn cooldown(mut self, v: f32) -> Self {
        self.cooldown = Some(v);
        self
    }
    fn range(mut self, v: f32) -> Self {
        self.range = Some(v);
        self
    }
    fn radius(mut self, v: f32) -> Self {
        self.radius = Some(v);
        self
    }
    fn area(mut self, v: f32) -> Self {
        self.area = Some(v);
        self
    }
    fn duration(mut self, v: f32) -> Self {
        self.duration = Some(v);
        self
    }
    fn projectiles(mut self, n: u32) -> Self {
        self.projectile_count = Some(n);
        self
    }
    fn bolts(mut self, n: u32) -> Self {
        self.bolt_count = Some(n);
        self
    }
    fn count(mut self, n: u32) -> Self {
        self.count = Some(n);
        self
    }
    fn chains(mut self, n: u32) -> Self {
        self.chain_count = Some(n);
        self
    }
    fn bounces(mut self, n: u32) -> Self {
        self.bounce_count = Some(n);
        self
    }
    fn explosion(mut self, v: f32) -> Self {
        self.explosion_radius = Some(v);
        self
    }
    fn turn_speed(mut self, v: f32) -> Self {
        self.turn_speed = Some(v);
        self
    }
    fn pierce(mut self, n: u32) -> Self {
        self.pierce = Some(n);
        self
    }
    fn lifesteal(mut self, v: f32) -> Self {
        self.lifesteal = Some(v);
        self
    }
    fn tracking(mut self) -> Self {
        self.tracking = Some(true);
        self
    }
    fn explode_on_bounce(mut self) -> Self {
        self.explosion_on_bounce = Some(true);
        self
    }
    fn cooldown_mult(mut self, v: f32) -> Self {
        self.cooldown_mult = Some(v);
        self
    }
}

fn t() -> TierStats {
    TierStats::default()
}

fn weapon(
    id: &str,
    name: &str,
    archetype: Archetype,
    tags: &[&str],
    tiers: Vec<TierStats>,
    evolution: (&str, &str, u32),
) -> WeaponDefinition {
    WeaponDefinition {
        id: id.to_string(),
        name: name.to_string(),
        max_tier: tiers.len() as u32,
        tags: tags.iter().map(|t| t.to_string()).collect(),
        archetype,
        tiers,
        evolution: Some(EvolutionRule {
            result_weapon_id: evolution.0.to_string(),
            required_passive_id: evolution.1.to_string(),
            required_passive_tier: evolution.2,
        }),
    }
}

pub(super) fn weapons() -> Vec<WeaponDefinition> {
    use Archetype::*;
    vec![
        weapon(
            "w_whip",
            "Whip",
            MeleeArc,
            &["melee"],
            vec![
                t().damage(10.0).cooldown(1.2).range(1.0),
                t().damage(13.0).cooldown(1.0).range(1.1),
                t().damage(16.0).cooldown(1.0).range(1.2),
                t().damage(20.0).cooldown(0.9).range(1.3),
                t().damage(25.0).cooldown(0.5).range(1.4),
            ],
            ("w_bloodyTear", "p_hollowHeart", 3),
        ),
        weapon(
            "w_knife",
            "Knife",
            StraightProjectile,
            &["projectile"],
            vec![
                t().damage(8.0).projectiles(1).cooldown(1.5),
                t().damage(10.0).projectiles(1).cooldown(1.4),
                t().damage(10.0).projectiles(2).cooldown(1.3),
                t().damage(13.0).projectiles(2).cooldown(1.2),
                t().damage(14.0).projectiles(3).cooldown(0.8),
            ],
            ("w_thousandEdge", "p_bracer", 3),
        ),
        weapon(
            "w_homingMissile",
            "Homing Missile",
            HomingProjectile,
            &["projectile", "homing"],
            vec![
                t().damage(10.0).projectiles(1).cooldown(2.5),
                t().damage(12.0).projectiles(1).cooldown(2.3),
                t().damage(12.0).projectiles(2).cooldown(2.1),
                t().damage(15.0).projectiles(2).cooldown(1.9),
                t().damage(18.0).projectiles(3).cooldown(1.5),
            ],
            ("w_advancedMissile", "p_bracer", 3),
        ),
        weapon(
            "w_magicWand",
            "Magic Wand",
            AutoAimProjectile,
            &["projectile", "auto-aim"],
            vec![
                t().damage(7.0).projectiles(1).cooldown(2.5),
                t().damage(9.0).projectiles(1).cooldown(2.3),
                t().damage(9.0).projectiles(2).cooldown(2.1),
                t().damage(12.0).projectiles(2).cooldown(1.9),
                t().damage(12.0).projectiles(3).cooldown(1.5),
            ],
            ("w_holyWand", "p_spellbinder", 3),
        ),
        weapon(
            "w_garlic",
            "Garlic",
            Aura,
            &["aura", "melee"],
            vec![
                t().dps(6.0).radius(1.0),
                t().dps(8.0).radius(1.15),
                t().dps(8.0).radius(1.3),
                t().dps(11.0).radius(1.4),
                t().dps(11.0).radius(1.9),
            ],
            ("w_soulEater", "p_pummarola", 3),
        ),
        weapon(
            "w_santaWater",
            "Santa Water",
            GroundZone,
            &["ground", "aoe"],
            vec![
                t().dps(10.0).duration(1.0).area(1.0).cooldown(2.5),
                t().dps(12.0).duration(2.0).area(1.0).cooldown(2.3),
                t().dps(12.0).duration(2.0).area(1.1).cooldown(2.1),
                t().dps(12.0).duration(2.2).area(1.15).cooldown(1.9),
                t().dps(15.0).duration(2.5).area(1.25).cooldown(1.5),
            ],
            ("w_laBorra", "p_attractorb", 3),
        ),
        weapon(
            "w_kingBible",
            "King Bible",
            Orbital,
            &["orbital", "defense"],
            vec![
                t().dps(12.0).count(1).duration(1.0),
                t().dps(14.0).count(2).duration(1.0),
                t().dps(14.0).count(2).duration(1.2),
                t().dps(17.0).count(3).duration(1.2),
                t().dps(19.0).count(4).duration(1.2).cooldown_mult(0.9),
            ],
            ("w_unchainedSpirits", "p_spellbinder", 3),
        ),
        weapon(
            "w_lightningRing",
            "Lightning Ring",
            ChainStrike,
            &["aoe", "random"],
            vec![
                t().damage(14.0).bolts(1).cooldown(1.0),
                t().damage(17.0).bolts(1).cooldown(0.9),
                t().damage(17.0).bolts(2).cooldown(0.8),
                t().damage(21.0).bolts(2).cooldown(0.7),
                t().damage(21.0).bolts(3).cooldown(0.6),
            ],
            ("w_thunderLoop", "p_duplicator", 3),
        ),
        weapon(
            "w_fireWand",
            "Fire Wand",
            ExplosiveProjectile,
            &["projectile", "explosive"],
            vec![
                t().damage(10.0).projectiles(1).explosion(1.0).cooldown(2.5),
                t().damage(13.0).projectiles(1).explosion(1.0).cooldown(2.3),
                t().damage(13.0).projectiles(1).explosion(1.15).cooldown(2.1),
                t().damage(13.0).projectiles(2).explosion(1.15).cooldown(1.9),
                t().damage(17.0).projectiles(2).explosion(1.15).cooldown(1.5),
            ],
            ("w_hellfire", "p_spinach", 3),
        ),
        weapon(
            "w_runetracer",
            "Runetracer",
            BounceProjectile,
            &["projectile", "bounce"],
            vec![
                t().damage(9.0).bounces(2).duration(1.0),
                t().damage(11.0).bounces(2).duration(1.0),
                t().damage(11.0).bounces(3).duration(1.0),
                t().damage(11.0).bounces(3).duration(1.2),
                t().damage(14.0).bounces(3).duration(1.2),
            ],
            ("w_noFuture", "p_armor", 3),
        ),
    ]
}

fn passive(id: &str, name: &str, effect: EffectKind, tiers: [f32; 5]) -> PassiveDefinition {
    PassiveDefinition {
        id: id.to_string(),
        name: name.to_string(),
        max_tier: tiers.len() as u32,
        effect,
        tiers: tiers.to_vec(),
    }
}

pub(super) fn passives() -> Vec<PassiveDefinition> {
    use EffectKind::*;
    vec![
        passive("p_hollowHeart", "Hollow Heart", MaxHealth, [10.0, 20.0, 30.0, 40.0, 50.0]),
        passive("p_bracer", "Bracer", ProjectileSpeed, [0.1, 0.2, 0.3, 0.4, 0.5]),
        passive("p_spinach", "Spinach", Might, [0.05, 0.1, 0.15, 0.2, 0.25]),
        passive("p_candelabrador", "Candelabrador", Area, [0.05, 0.1, 0.15, 0.2, 0.25]),
        passive("p_spellbinder", "Spellbinder", Duration, [0.05, 0.1, 0.15, 0.2, 0.25]),
        passive("p_clover", "Clover", Luck, [5.0, 10.0, 15.0, 20.0, 25.0]),
        passive("p_pummarola", "Pummarola", HealthRegen, [0.1, 0.2, 0.3, 0.4, 0.5]),
        passive("p_attractorb", "Attractorb", PickupRadius, [0.1, 0.2, 0.3, 0.4, 0.5]),
        // Meaningful from tier 2
        passive("p_duplicator", "Duplicator", ProjectileCount, [0.0, 1.0, 1.0, 2.0, 2.0]),
        passive("p_armor", "Armor", DamageReduction, [1.0, 2.0, 3.0, 4.0, 5.0]),
        passive("p_crown", "Crown", ExperienceGain, [0.05, 0.1, 0.15, 0.2, 0.25]),
        passive("p_emptyTome", "Empty Tome", Cooldown, [0.05, 0.1, 0.15, 0.2, 0.25]),
    ]
}

fn evolution(
    id: &str,
    name: &str,
    base: &str,
    passive: &str,
    description: &str,
    stats: TierStats,
) -> EvolutionDefinition {
    EvolutionDefinition {
        id: id.to_string(),
        name: name.to_string(),
        base_weapon: base.to_string(),
        required_passive: passive.to_string(),
        required_passive_tier: 3,
        description: description.to_string(),
        stats,
    }
}

pub(super) fn evolutions() -> Vec<EvolutionDefinition> {
    vec![
        evolution(
            "w_bloodyTear",
            "Bloody Tear",
            "w_whip",
            "p_hollowHeart",
            "Wider, stronger lashes that drain health from every hit",
            t().damage(30.0).cooldown(1.0).range(1.3).lifesteal(0.1),
        ),
        evolution(
            "w_thousandEdge",
            "Thousand Edge",
            "w_knife",
            "p_bracer",
            "An endless stream of knives",
            t().damage(15.0).projectiles(5).cooldown(0.5),
        ),
        evolution(
            "w_advancedMissile",
            "Advanced Missile",
            "w_homingMissile",
            "p_bracer",
            "Missiles that turn far more sharply",
            t().damage(18.0).projectiles(2).cooldown(1.5).turn_speed(6.0),
        ),
        evolution(
            "w_holyWand",
            "Holy Wand",
            "w_magicWand",
            "p_spellbinder",
            "Fires volleys with almost no delay",
            t().damage(15.0).projectiles(4).cooldown(0.5),
        ),
        evolution(
            "w_soulEater",
            "Soul Eater",
            "w_garlic",
            "p_pummarola",
            "Aura that heals in proportion to damage dealt",
            t().dps(15.0).radius(1.4).lifesteal(0.15),
        ),
        evolution(
            "w_laBorra",
            "La Borra",
            "w_santaWater",
            "p_attractorb",
            "Pools that drift after the nearest enemy",
            t().dps(18.0).duration(3.0).area(1.3).tracking(),
        ),
        evolution(
            "w_unchainedSpirits",
            "Unchained Spirits",
            "w_kingBible",
            "p_spellbinder",
            "Five tomes in constant orbit",
            t().dps(10.0).count(5).duration(1.5).cooldown_mult(0.7),
        ),
        evolution(
            "w_thunderLoop",
            "Thunder Loop",
            "w_lightningRing",
            "p_duplicator",
            "More bolts that chain between enemies",
            t().damage(25.0).bolts(5).chains(3),
        ),
        evolution(
            "w_hellfire",
            "Hellfire",
            "w_fireWand",
            "p_spinach",
            "Piercing fireballs in wide volleys",
            t().damage(20.0).projectiles(4).explosion(1.3).pierce(2),
        ),
        evolution(
            "w_noFuture",
            "NO FUTURE",
            "w_runetracer",
            "p_armor",
            "Runes that explode on every bounce",
            t().damage(15.0).bounces(5).duration(1.5).explode_on_bounce(),
        ),
    ]
}
