/// Execute an aggregate command deterministically (no IO, no async).
///
/// 1. **Decide**: calls `aggregate.handle(command)` (pure, no mutation)
/// 2. **Evolve**: applies each decided event via `aggregate.apply(event)`
///
/// A rejected command returns the error before step 2, so the aggregate is
/// left exactly as it was. For the persisted, serialized pipeline use
/// `LedgerHost::execute` in `spacedao-infra`.
pub fn execute<A>(aggregate: &mut A, command: &A::Command) -> Result<Vec<A::Event>, A::Error>
where
    A: spacedao_core::Aggregate,
{
    let events = A::handle(aggregate, command)?;
    for ev in &events {
        A::apply(aggregate, ev);
    }
    Ok(events)
}
