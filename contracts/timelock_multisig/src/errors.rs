use soroban_sdk::contracterror;

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum MultisigError {
    NotInitialized = 0,
    AlreadyInitialized = 1,

    // Authorization
    NotOwner = 2,
    NotGuardian = 3,
    NotAuthorized = 4,

    // State
    TransactionNotFound = 10,
    ProposalNotFound = 11,
    InvalidStatus = 12,
    AlreadyConfirmed = 13,
    NotConfirmed = 14,
    EmergencyActive = 15,
    EmergencyNotActive = 16,
    Reentrancy = 17,

    // Temporal
    TimeLockActive = 20,
    TransactionExpired = 21,
    NotExpired = 22,
    RecoveryTimeoutActive = 23,

    // Policy
    InvalidThreshold = 30,
    EmptyOwners = 31,
    TooManyOwners = 32,
    DuplicateOwner = 33,
    OwnerNotFound = 34,
    ThresholdViolation = 35,
    DuplicateGuardian = 36,
    GuardianNotFound = 37,
    InvalidTarget = 38,
    EmptyDescription = 39,
    InvalidAmount = 40,
    InvalidTimeLock = 41,
    InvalidDailyLimit = 42,
    DailyLimitExceeded = 43,
    InsufficientBalance = 44,

    // External call
    ExecutionFailed = 50,
}
