use thiserror::Error;

use marchlands_protocol::{ActionKind, CityId, PlayerId, Tile, UnitId, UnitKind};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GameError {
    /// The action is not legal against the current state; nothing changed.
    #[error("{0}")]
    Rejected(#[from] RejectReason),
    #[error("game is over")]
    GameOver,
    #[error("invalid game setup: {0}")]
    Setup(String),
    /// A state invariant broke. Only a bug produces this.
    #[error("invariant violated: {0}")]
    Invariant(String),
}

impl From<DiplomacyError> for GameError {
    fn from(err: DiplomacyError) -> Self {
        GameError::Rejected(RejectReason::Diplomacy(err))
    }
}

/// Why an action was refused, phrased for the player who proposed it.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RejectReason {
    #[error("{kind} is not available right now")]
    NotInMenu { kind: ActionKind },
    #[error("it is not player {0}'s turn")]
    NotYourTurn(PlayerId),
    #[error("unit {0} does not exist")]
    UnknownUnit(UnitId),
    #[error("city {0} does not exist")]
    UnknownCity(CityId),
    #[error("unit {0} belongs to another player")]
    NotYourUnit(UnitId),
    #[error("city {0} belongs to another player")]
    NotYourCity(CityId),
    #[error("unit {0} has already moved this turn")]
    AlreadyMoved(UnitId),
    #[error("unit {0} has already attacked this turn")]
    AlreadyAttacked(UnitId),
    #[error("unit {0} has already acted this turn")]
    AlreadyActed(UnitId),
    #[error("tile {0} is outside the map")]
    OutOfBounds(Tile),
    #[error("tile {target} is {distance} tiles away but the unit moves {movement}")]
    OutOfRange {
        target: Tile,
        distance: i32,
        movement: i32,
    },
    #[error("tile {0} is already occupied by a unit")]
    DestinationOccupied(Tile),
    #[error("tile {0} holds one of your own cities")]
    FriendlyCity(Tile),
    #[error("no enemy unit in attack range at {0}")]
    NoTarget(Tile),
    #[error("a unit was already purchased this turn")]
    AlreadyPurchased,
    #[error("city {0} already has a unit standing on it")]
    CityOccupied(CityId),
    #[error("cannot afford {cost} coins with {coins}")]
    CannotAfford { cost: i32, coins: i32 },
    #[error("only colonizers can found cities, unit is a {0}")]
    NotAColonizer(UnitKind),
    #[error("too close to the city at {0}; cities must be at least 2 tiles apart")]
    CityTooClose(Tile),
    #[error("no city to conquer under unit {0}")]
    NoCityHere(UnitId),
    #[error("cannot conquer a city of player {0}")]
    ProtectedCity(PlayerId),
    #[error(transparent)]
    Diplomacy(#[from] DiplomacyError),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DiplomacyError {
    #[error("players cannot negotiate with themselves")]
    SamePlayer,
    #[error("player {0} is not in the game")]
    UnknownPlayer(PlayerId),
    #[error("a treaty with player {0} already exists")]
    AlreadyAllied(PlayerId),
    #[error("at war with player {0}")]
    AtWar(PlayerId),
    #[error("not at war with player {0}")]
    NotAtWar(PlayerId),
    #[error("peace with player {enemy} is locked for {turns_remaining} more turns")]
    WarLocked { enemy: PlayerId, turns_remaining: u32 },
    #[error("no pending proposal from player {0}")]
    NoPendingProposal(PlayerId),
    #[error("a proposal to player {0} is already pending")]
    DuplicateProposal(PlayerId),
    #[error("player {0} has already made an offer; answer it instead")]
    OfferAwaitingAnswer(PlayerId),
    #[error("no treaty with player {0}")]
    NoTreaty(PlayerId),
}
