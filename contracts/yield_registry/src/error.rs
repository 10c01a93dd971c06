use soroban_sdk::contracterror;

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum Error {
    // ============================================
    // INITIALIZATION ERRORS (1-9)
    // ============================================
    /// Contract already initialized
    AlreadyInitialized = 1,
    /// Contract not initialized
    NotInitialized = 2,

    // ============================================
    // AUTHORIZATION ERRORS (10-19)
    // ============================================
    /// Caller is not the collection owner
    Unauthorized = 10,

    // ============================================
    // REGISTRATION ERRORS (20-29)
    // ============================================
    /// Collection has no registration entry
    CollectionNotRegistered = 20,
    /// One-shot registration called for a collection that already exists
    AlreadyRegistered = 21,
    /// Terms cannot change once deposits have been made
    Immutable = 22,
    /// Supplied OTC terms differ from the OTC oracle's record
    OtcMismatch = 23,

    // ============================================
    // PARAMETER ERRORS (30-39)
    // ============================================
    /// Deposit amount must be positive
    InvalidAmount = 30,
    /// OTC price must be positive
    InvalidPrice = 31,
    /// Collection size must be positive
    InvalidSize = 32,

    // ============================================
    // DEPOSIT ERRORS (40-49)
    // ============================================
    /// Token already holds a deposit
    AlreadyDeposited = 40,
    /// Token holds no deposit to operate on
    NothingDeposited = 41,
    /// OTC payment is less than price times token count
    InsufficientOtcFunds = 42,

    // ============================================
    // TOKEN OWNERSHIP ERRORS (50-59)
    // ============================================
    /// Collection contract could not resolve the token
    NonexistentToken = 50,
    /// Token exists but the caller is not its holder
    NotOwner = 51,

    // ============================================
    // MIGRATION ERRORS (60-69)
    // ============================================
    /// Position has unclaimed yield; claim before upgrading
    MustClaimFirst = 60,
    /// Batch contains at least one already-upgraded token
    SomeAlreadyUpgraded = 61,
    /// No upgrade destination has been configured
    UpgradeUnavailable = 62,
}
