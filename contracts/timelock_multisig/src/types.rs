use soroban_sdk::{contracttype, Address, String, Symbol, Val, Vec};

pub const MAX_OWNERS: u32 = 20;
pub const DAY_IN_SECONDS: u64 = 86_400;
pub const MIN_TIME_LOCK: u64 = 3_600; // 1 hour
pub const MAX_TIME_LOCK: u64 = 2_592_000; // 30 days
pub const RECOVERY_TIMEOUT: u64 = 2_592_000; // 30 days
/// How long a queued item stays executable once its time-lock has elapsed.
pub const EXECUTION_GRACE_PERIOD: u64 = 2_592_000; // 30 days

#[contracttype]
#[derive(Clone)]
pub enum DataKey {
    Initialized,
    Asset,
    InstantLimit,
    TimeLockDelay,
    Owners,
    Threshold,
    Guardians,
    DailyLimit,
    Emergency,
    TransactionCount,
    Transaction(u64),
    ProposalCount,
    Proposal(u64),
    OpenTransactions,
}

/// Deploy-time parameters of a vault.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct VaultConfig {
    /// Token contract whose balance the vault moves.
    pub asset: Address,
    /// Largest payload-free transfer that may skip the time-lock.
    pub instant_limit: i128,
    pub daily_limit: i128,
    /// Ordinary time-lock in seconds. Proposals wait twice as long.
    pub time_lock_delay: u64,
}

/// Outbound contract invocation attached to a transaction.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ContractCall {
    pub function: Symbol,
    pub args: Vec<Val>,
}

/// Stored form of a transaction's optional contract call.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Payload {
    None,
    Call(ContractCall),
}

impl Payload {
    pub fn is_call(&self) -> bool {
        matches!(self, Payload::Call(_))
    }
}

impl From<Option<ContractCall>> for Payload {
    fn from(call: Option<ContractCall>) -> Self {
        match call {
            Some(call) => Payload::Call(call),
            None => Payload::None,
        }
    }
}

#[contracttype]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum TxStatus {
    Pending,
    Queued,
    Executed,
    Cancelled,
    Expired,
}

impl TxStatus {
    pub fn is_open(&self) -> bool {
        matches!(self, TxStatus::Pending | TxStatus::Queued)
    }
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Transaction {
    pub id: u64,
    pub proposer: Address,
    pub to: Address,
    pub value: i128,
    pub payload: Payload,
    pub description: String,
    pub confirmation_count: u32,
    pub confirmed_by: Vec<Address>,
    pub status: TxStatus,
    pub created_at: u64,
    pub queued_at: u64,
    pub execute_after: u64,
}

/// Self-modifying actions a governance proposal can carry.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ProposalAction {
    AddOwner(Address),
    RemoveOwner(Address),
    ChangeThreshold(u32),
    ChangeTimeLock(u64),
    ChangeDailyLimit(i128),
    EmergencyRecovery(Address),
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Proposal {
    pub id: u64,
    pub proposer: Address,
    pub action: ProposalAction,
    pub description: String,
    pub confirmation_count: u32,
    pub confirmed_by: Vec<Address>,
    pub status: TxStatus,
    pub created_at: u64,
    pub queued_at: u64,
    pub execute_after: u64,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DailyLimit {
    pub limit: i128,
    pub spent: i128,
    pub last_reset_time: u64,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct EmergencyState {
    pub active: bool,
    pub activated_at: u64,
}
