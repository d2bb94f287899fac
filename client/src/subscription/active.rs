use alloy_primitives::Address;

use super::tiers;
use crate::model::{PermissionGrant, SpendClause};

/// The grant currently backing the subscription and its active tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActiveSubscription<'a> {
    pub grant: &'a PermissionGrant,
    pub clause: &'a SpendClause,
    pub tier_index: usize,
}

/// Find the active subscription in `permissions` (`None` while loading).
///
/// With a pending id only the grant carrying that id is considered.
/// Otherwise the first grant spending `token` is taken. Inside the grant the
/// last spend clause is the active tier, and it only counts when its period
/// belongs to the tier catalog.
pub fn derive_active_subscription<'a>(
    permissions: Option<&'a [PermissionGrant]>,
    pending_id: Option<&str>,
    token: Address,
) -> Option<ActiveSubscription<'a>> {
    let grant = permissions?.iter().find(|grant| match pending_id {
        Some(id) => grant.id == id,
        None => grant.spends_token(token),
    })?;

    let clause = grant.permissions.spend.last()?;
    let tier_index = tiers::tier_index(clause.period)?;

    Some(ActiveSubscription {
        grant,
        clause,
        tier_index,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{GrantKey, KeyType, Period, Permissions};
    use alloy_primitives::U256;

    const TOKEN: Address = Address::ZERO;

    fn clause(period: Period, token: Option<Address>) -> SpendClause {
        SpendClause {
            limit: U256::from(1u64),
            period,
            token,
        }
    }

    fn grant(id: &str, spend: Vec<SpendClause>) -> PermissionGrant {
        PermissionGrant {
            id: id.to_string(),
            address: None,
            chain_id: None,
            expiry: 0,
            key: GrantKey {
                public_key: "0x01".to_string(),
                key_type: KeyType::P256,
            },
            permissions: Permissions {
                calls: Vec::new(),
                spend,
            },
        }
    }

    #[test]
    fn nothing_while_loading() {
        assert!(derive_active_subscription(None, None, TOKEN).is_none());
        assert!(derive_active_subscription(None, Some("0x1"), TOKEN).is_none());
    }

    #[test]
    fn first_matching_grant_last_clause_wins() {
        let other = Address::repeat_byte(0x44);
        let list = vec![
            grant("a", vec![clause(Period::Year, Some(other))]),
            grant(
                "b",
                vec![clause(Period::Week, Some(TOKEN)), clause(Period::Year, Some(TOKEN))],
            ),
            grant("c", vec![clause(Period::Month, Some(TOKEN))]),
        ];

        let active = derive_active_subscription(Some(&list), None, TOKEN).unwrap();
        assert_eq!(active.grant.id, "b");
        assert_eq!(active.clause.period, Period::Year);
        assert_eq!(active.tier_index, 2);
    }

    #[test]
    fn pending_id_takes_precedence() {
        let list = vec![
            grant("a", vec![clause(Period::Week, Some(TOKEN))]),
            grant("b", vec![clause(Period::Month, None)]),
        ];

        let active = derive_active_subscription(Some(&list), Some("b"), TOKEN).unwrap();
        assert_eq!(active.grant.id, "b");
        assert_eq!(active.tier_index, 1);
    }

    #[test]
    fn unknown_pending_id_does_not_fall_back() {
        let list = vec![grant("a", vec![clause(Period::Week, Some(TOKEN))])];
        assert!(derive_active_subscription(Some(&list), Some("zzz"), TOKEN).is_none());
    }

    #[test]
    fn period_outside_catalog_is_no_subscription() {
        let list = vec![grant(
            "a",
            vec![clause(Period::Month, Some(TOKEN)), clause(Period::Day, Some(TOKEN))],
        )];
        assert!(derive_active_subscription(Some(&list), None, TOKEN).is_none());
    }

    #[test]
    fn derived_period_is_always_a_catalog_unit() {
        let periods = [
            Period::Minute,
            Period::Hour,
            Period::Day,
            Period::Week,
            Period::Month,
            Period::Year,
        ];
        for period in periods {
            let list = vec![grant("a", vec![clause(period, Some(TOKEN))])];
            match derive_active_subscription(Some(&list), None, TOKEN) {
                Some(active) => assert_eq!(tiers::tier_index(active.clause.period), Some(active.tier_index)),
                None => assert!(tiers::tier_index(period).is_none()),
            }
        }
    }
}
