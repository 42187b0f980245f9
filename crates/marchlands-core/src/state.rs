use marchlands_protocol::{
    CityId, CityTag, GameSnapshot, PlayerId, PlayerSnapshot, ScoreEntry, Tile, UnitId, UnitTag,
};

use crate::{
    generate_player_name, Behavior, City, EntityStore, GameConfig, GameError, GameRng, Player,
    TerritoryMap, Unit,
};

const SPAWN_ATTEMPTS: usize = 10_000;

/// Complete state of one game instance. Owns every entity.
#[derive(Clone, Debug)]
pub struct GameState {
    pub grid_size: i32,
    /// Starts at 1; increments when the rotation wraps.
    pub round: u32,
    /// Players still in the rotation, in turn order.
    pub players: Vec<Player>,
    pub eliminated: Vec<Player>,
    pub units: EntityStore<UnitTag, Unit>,
    pub cities: EntityStore<CityTag, City>,
    /// Index into `players` of whoever is taking their turn.
    pub current: usize,
    /// Per-turn, per-player gate: one purchase per turn.
    pub purchased_this_turn: bool,
    pub winner: Option<PlayerId>,
}

impl GameState {
    pub fn new_game(config: &GameConfig) -> Result<Self, GameError> {
        if config.player_count < 2 {
            return Err(GameError::Setup(format!(
                "need at least 2 players, got {}",
                config.player_count
            )));
        }
        if config.grid_size < 1 {
            return Err(GameError::Setup(format!(
                "grid size must be positive, got {}",
                config.grid_size
            )));
        }

        let mut rng = GameRng::seed_from_u64(config.seed);
        let mut behaviors = Behavior::ALL;
        rng.shuffle(&mut behaviors);

        let mut players = Vec::with_capacity(config.player_count as usize);
        for i in 0..config.player_count {
            let id = PlayerId(i);
            let behavior = behaviors[i as usize % behaviors.len()];
            let name = generate_player_name(&mut rng, behavior);
            let mut player = Player::new(id, name, behavior, config.starting_coins);
            player.is_human = config.human_players.contains(&id);
            players.push(player);
        }

        let ids: Vec<PlayerId> = players.iter().map(|p| p.id).collect();
        for player in &mut players {
            player.diplomacy.initialize_relations(player.id, ids.iter().copied());
        }

        let mut state = Self::new_for_tests(config.grid_size, players);

        let mut spawned: Vec<Tile> = Vec::new();
        for index in 0..state.players.len() {
            let pos = pick_spawn(&mut rng, config.grid_size, config.spawn_min_distance, &spawned)
                .ok_or_else(|| {
                    GameError::Setup(format!(
                        "no room for {} starting cities on a {}x{} grid",
                        config.player_count, config.grid_size, config.grid_size
                    ))
                })?;
            spawned.push(pos);
            let owner = state.players[index].id;
            state.add_city(owner, pos);
        }

        tracing::info!(
            players = state.players.len(),
            grid = config.grid_size,
            seed = config.seed,
            "new game"
        );
        Ok(state)
    }

    /// Bare state with the given players and no entities; first player active.
    pub fn new_for_tests(grid_size: i32, mut players: Vec<Player>) -> Self {
        if let Some(first) = players.first_mut() {
            first.is_active = true;
        }
        Self {
            grid_size,
            round: 1,
            players,
            eliminated: Vec::new(),
            units: EntityStore::default(),
            cities: EntityStore::default(),
            current: 0,
            purchased_this_turn: false,
            winner: None,
        }
    }

    pub fn is_game_over(&self) -> bool {
        self.winner.is_some()
    }

    pub fn current_player(&self) -> Option<&Player> {
        self.players.get(self.current)
    }

    pub fn current_player_id(&self) -> Option<PlayerId> {
        self.current_player().map(|p| p.id)
    }

    pub fn player_index(&self, id: PlayerId) -> Option<usize> {
        self.players.iter().position(|p| p.id == id)
    }

    /// An active (not eliminated) player.
    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }

    pub fn player_mut(&mut self, id: PlayerId) -> Option<&mut Player> {
        self.players.iter_mut().find(|p| p.id == id)
    }

    pub fn unit_at(&self, pos: Tile) -> Option<(UnitId, &Unit)> {
        self.units.iter_ordered().find(|(_, u)| u.pos == pos)
    }

    pub fn city_at(&self, pos: Tile) -> Option<(CityId, &City)> {
        self.cities.iter_ordered().find(|(_, c)| c.pos == pos)
    }

    /// Peace treaty between the two, as seen from `a`'s ledger.
    pub fn has_treaty(&self, a: PlayerId, b: PlayerId) -> bool {
        self.player(a)
            .is_some_and(|p| p.diplomacy.has_treaty(b))
    }

    /// Units of another player that `player` may fight: not own, not treaty partners.
    pub fn is_hostile(&self, player: PlayerId, other: PlayerId) -> bool {
        player != other && !self.has_treaty(player, other)
    }

    pub fn add_city(&mut self, owner: PlayerId, pos: Tile) -> CityId {
        let id = self.cities.insert(City::new(owner, pos, self.grid_size));
        if let Some(player) = self.player_mut(owner) {
            player.cities.push(id);
        }
        id
    }

    pub fn add_unit(&mut self, unit: Unit) -> UnitId {
        let owner = unit.owner;
        let id = self.units.insert(unit);
        if let Some(player) = self.player_mut(owner) {
            player.units.push(id);
        }
        id
    }

    /// Removes a unit from the global set and its owner's roster together.
    pub fn remove_unit(&mut self, id: UnitId) -> Option<Unit> {
        let unit = self.units.remove(id)?;
        if let Some(player) = self.player_mut(unit.owner) {
            player.remove_unit(id);
        }
        Some(unit)
    }

    pub fn territory(&self) -> TerritoryMap {
        TerritoryMap::build(self.cities.iter_ordered())
    }

    /// Sum of the player's city territory sizes.
    pub fn territory_size(&self, player: PlayerId) -> i32 {
        self.player(player)
            .map(|p| {
                p.cities
                    .iter()
                    .filter_map(|id| self.cities.get(*id))
                    .map(City::territory_size)
                    .sum()
            })
            .unwrap_or(0)
    }

    /// territory x 10 plus the unit-type weights.
    pub fn score(&self, player: PlayerId) -> i32 {
        let Some(p) = self.player(player) else {
            return 0;
        };
        let units: i32 = p
            .units
            .iter()
            .filter_map(|id| self.units.get(*id))
            .map(|u| u.kind.score_weight())
            .sum();
        self.territory_size(player) * 10 + units
    }

    /// Score table, highest first; ties keep turn order.
    pub fn rankings(&self) -> Vec<ScoreEntry> {
        let mut table: Vec<ScoreEntry> = self
            .players
            .iter()
            .map(|p| ScoreEntry {
                player: p.id,
                name: p.name.clone(),
                score: self.score(p.id),
            })
            .collect();
        table.sort_by(|a, b| b.score.cmp(&a.score));
        table
    }

    pub fn base_income(&self, player: PlayerId) -> i32 {
        self.player(player)
            .map(|p| {
                p.cities
                    .iter()
                    .filter_map(|id| self.cities.get(*id))
                    .map(|c| c.level as i32)
                    .sum()
            })
            .unwrap_or(0)
    }

    pub fn snapshot(&self) -> GameSnapshot {
        let players = self
            .players
            .iter()
            .map(|p| self.player_snapshot(p, true))
            .chain(self.eliminated.iter().map(|p| self.player_snapshot(p, false)))
            .collect();

        GameSnapshot {
            round: self.round,
            grid_size: self.grid_size,
            current_player: self.current_player_id(),
            winner: self.winner,
            players,
            units: self
                .units
                .iter_ordered()
                .map(|(id, u)| u.snapshot(id))
                .collect(),
            cities: self
                .cities
                .iter_ordered()
                .map(|(id, c)| c.snapshot(id))
                .collect(),
            territory: self.territory().tiles(),
            rankings: self.rankings(),
        }
    }

    fn player_snapshot(&self, p: &Player, active: bool) -> PlayerSnapshot {
        PlayerSnapshot {
            id: p.id,
            name: p.name.clone(),
            behavior: p.behavior.name().to_string(),
            coins: p.coins,
            score: self.score(p.id),
            territory_size: self.territory_size(p.id),
            active,
            is_human: p.is_human,
        }
    }
}

fn pick_spawn(rng: &mut GameRng, grid_size: i32, min_distance: f64, taken: &[Tile]) -> Option<Tile> {
    for _ in 0..SPAWN_ATTEMPTS {
        let candidate = Tile::new(rng.gen_range_i32(0..grid_size), rng.gen_range_i32(0..grid_size));
        if taken.iter().all(|t| t.euclidean(candidate) >= min_distance) {
            return Some(candidate);
        }
    }
    None
}
