//! Jupiter v6 swap events.
//!
//! On every leg the router self-invokes with an Anchor event instruction:
//! 8-byte event tag, 8-byte event discriminator
//! (`sha256("event:<Name>")[..8]`), then the borsh-encoded event body.

use borsh::BorshDeserialize;

use crate::address::Address;
use crate::error::Error;
use crate::summary::RawSwap;

/// Anchor's `EVENT_IX_TAG` in little-endian byte order.
pub const EVENT_IX_TAG: [u8; 8] = [0xe4, 0x45, 0xa5, 0x2e, 0x51, 0xcb, 0x9a, 0x1d];

/// `event:SwapEvent`, a single leg.
pub const SWAP_EVENT_DISCRIMINATOR: [u8; 8] = [0x40, 0xc6, 0xcd, 0xe8, 0x26, 0x08, 0x71, 0xe2];

/// `event:SwapsEvent`, a vector of legs without venue.
pub const SWAPS_EVENT_DISCRIMINATOR: [u8; 8] = [0x98, 0x2f, 0x4e, 0xeb, 0xc0, 0x60, 0x6e, 0x6a];

const EVENT_HEADER_LEN: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::AsRefStr)]
pub enum SwapEventKind {
    SwapEvent,
    SwapsEvent,
}

impl SwapEventKind {
    /// Kind of an event payload, or `None` if it is not a swap event.
    pub fn classify(data: &[u8]) -> Option<Self> {
        if data.get(..8)? != EVENT_IX_TAG {
            return None;
        }
        let discriminator: [u8; 8] = data.get(8..EVENT_HEADER_LEN)?.try_into().ok()?;
        match discriminator {
            SWAP_EVENT_DISCRIMINATOR => Some(Self::SwapEvent),
            SWAPS_EVENT_DISCRIMINATOR => Some(Self::SwapsEvent),
            _ => None,
        }
    }
}

#[derive(BorshDeserialize, Debug, Clone, Copy, PartialEq, Eq)]
struct SwapEventBody {
    amm: [u8; 32],
    input_mint: [u8; 32],
    input_amount: u64,
    output_mint: [u8; 32],
    output_amount: u64,
}

#[derive(BorshDeserialize, Debug, Clone, Copy, PartialEq, Eq)]
struct SwapEventV2Body {
    input_mint: [u8; 32],
    input_amount: u64,
    output_mint: [u8; 32],
    output_amount: u64,
}

#[derive(BorshDeserialize, Debug, Clone, PartialEq, Eq)]
struct SwapsEventBody {
    swap_events: Vec<SwapEventV2Body>,
}

/// Decode the legs carried by one event payload, header included.
pub fn decode_legs(kind: SwapEventKind, data: &[u8]) -> Result<Vec<RawSwap>, Error> {
    let body = data.get(EVENT_HEADER_LEN..).ok_or_else(|| Error::Decode {
        reason: format!("Jupiter event payload of {} bytes has no body", data.len()),
    })?;

    match kind {
        SwapEventKind::SwapEvent => {
            let event: SwapEventBody = crate::protocols::decode_layout(body, "Jupiter SwapEvent")?;
            Ok(vec![RawSwap {
                amm: Some(Address::new_from_array(event.amm)),
                input_mint: Address::new_from_array(event.input_mint),
                input_amount: event.input_amount,
                output_mint: Address::new_from_array(event.output_mint),
                output_amount: event.output_amount,
            }])
        }
        SwapEventKind::SwapsEvent => {
            let event: SwapsEventBody =
                crate::protocols::decode_layout(body, "Jupiter SwapsEvent")?;
            Ok(event
                .swap_events
                .into_iter()
                .map(|leg| RawSwap {
                    amm: None,
                    input_mint: Address::new_from_array(leg.input_mint),
                    input_amount: leg.input_amount,
                    output_mint: Address::new_from_array(leg.output_mint),
                    output_amount: leg.output_amount,
                })
                .collect())
        }
    }
}

/// Fold the legs of a routed swap into one swap.
///
/// Input is the sum over legs spending the first leg's input mint, output the
/// sum over legs producing the last leg's output mint. Intermediate mints of
/// multi-hop routes drop out. The venue is the last leg's.
pub fn aggregate_legs(legs: &[RawSwap]) -> Result<Option<RawSwap>, Error> {
    let (Some(first), Some(last)) = (legs.first(), legs.last()) else {
        return Ok(None);
    };

    let input_amount = checked_sum(
        legs.iter()
            .filter(|leg| leg.input_mint == first.input_mint)
            .map(|leg| leg.input_amount),
        &first.input_mint,
    )?;
    let output_amount = checked_sum(
        legs.iter()
            .filter(|leg| leg.output_mint == last.output_mint)
            .map(|leg| leg.output_amount),
        &last.output_mint,
    )?;

    Ok(Some(RawSwap {
        amm: last.amm,
        input_mint: first.input_mint,
        input_amount,
        output_mint: last.output_mint,
        output_amount,
    }))
}

fn checked_sum(mut amounts: impl Iterator<Item = u64>, mint: &Address) -> Result<u64, Error> {
    amounts
        .try_fold(0_u64, u64::checked_add)
        .ok_or_else(|| Error::AmountOverflow {
            mint: mint.to_string(),
        })
}

#[cfg(test)]
pub(crate) fn encode_swap_event(leg: &RawSwap) -> Vec<u8> {
    let mut data = EVENT_IX_TAG.to_vec();
    data.extend_from_slice(&SWAP_EVENT_DISCRIMINATOR);
    data.extend_from_slice(leg.amm.unwrap_or_default().as_bytes());
    data.extend_from_slice(leg.input_mint.as_bytes());
    data.extend_from_slice(&leg.input_amount.to_le_bytes());
    data.extend_from_slice(leg.output_mint.as_bytes());
    data.extend_from_slice(&leg.output_amount.to_le_bytes());
    data
}

#[cfg(test)]
pub(crate) fn encode_swaps_event(legs: &[RawSwap]) -> Vec<u8> {
    let mut data = EVENT_IX_TAG.to_vec();
    data.extend_from_slice(&SWAPS_EVENT_DISCRIMINATOR);
    data.extend_from_slice(&(legs.len() as u32).to_le_bytes());
    for leg in legs {
        data.extend_from_slice(leg.input_mint.as_bytes());
        data.extend_from_slice(&leg.input_amount.to_le_bytes());
        data.extend_from_slice(leg.output_mint.as_bytes());
        data.extend_from_slice(&leg.output_amount.to_le_bytes());
    }
    data
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "test assertions")]
mod tests {
    use super::*;

    fn lcg_next(state: &mut u64) -> u64 {
        *state = state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1);
        *state
    }

    fn mint(n: u8) -> Address {
        Address::new_from_array([n; 32])
    }

    fn leg(input: u8, input_amount: u64, output: u8, output_amount: u64) -> RawSwap {
        RawSwap {
            amm: None,
            input_mint: mint(input),
            input_amount,
            output_mint: mint(output),
            output_amount,
        }
    }

    #[test]
    fn classify_requires_event_tag_and_known_discriminator() {
        let single = encode_swap_event(&leg(1, 1, 2, 1));
        assert_eq!(SwapEventKind::classify(&single), Some(SwapEventKind::SwapEvent));

        let many = encode_swaps_event(&[leg(1, 1, 2, 1)]);
        assert_eq!(SwapEventKind::classify(&many), Some(SwapEventKind::SwapsEvent));

        let mut untagged = single.clone();
        untagged[0] = 0;
        assert_eq!(SwapEventKind::classify(&untagged), None);

        let mut other_event = single;
        other_event[8] ^= 0xff;
        assert_eq!(SwapEventKind::classify(&other_event), None);

        assert_eq!(SwapEventKind::classify(&EVENT_IX_TAG), None);
    }

    #[test]
    fn decode_single_leg_event_keeps_amm() {
        let expected = RawSwap {
            amm: Some(mint(9)),
            ..leg(1, 1_000_000, 2, 4_260)
        };
        let data = encode_swap_event(&expected);
        let legs = decode_legs(SwapEventKind::SwapEvent, &data).unwrap();
        assert_eq!(legs, vec![expected]);
    }

    #[test]
    fn decode_multi_leg_event_in_order() {
        let legs = [leg(1, 100, 3, 55), leg(3, 55, 2, 90)];
        let data = encode_swaps_event(&legs);
        assert_eq!(
            decode_legs(SwapEventKind::SwapsEvent, &data).unwrap(),
            legs.to_vec()
        );
    }

    #[test]
    fn truncated_event_is_a_decode_error() {
        let data = encode_swap_event(&leg(1, 1, 2, 1));
        let result = decode_legs(SwapEventKind::SwapEvent, &data[..data.len() - 4]);
        assert!(matches!(result, Err(Error::Decode { .. })));

        let result = decode_legs(SwapEventKind::SwapEvent, &data[..10]);
        assert!(matches!(result, Err(Error::Decode { .. })));
    }

    #[test]
    fn single_leg_aggregates_to_itself() {
        let only = RawSwap {
            amm: Some(mint(7)),
            ..leg(1, 1_000_000, 2, 4_260)
        };
        assert_eq!(aggregate_legs(&[only.clone()]).unwrap(), Some(only));
    }

    #[test]
    fn multi_hop_drops_intermediate_mint() {
        let swap = aggregate_legs(&[leg(1, 100, 3, 95), leg(3, 95, 2, 90)])
            .unwrap()
            .unwrap();
        assert_eq!(swap, leg(1, 100, 2, 90));
    }

    #[test]
    fn split_route_sums_boundary_mints() {
        // 1 -> 2 directly, and 1 -> 3 -> 2.
        let legs = [
            leg(1, 60, 2, 50),
            leg(1, 40, 3, 400),
            RawSwap {
                amm: Some(mint(8)),
                ..leg(3, 400, 2, 33)
            },
        ];
        let swap = aggregate_legs(&legs).unwrap().unwrap();
        assert_eq!(swap.input_mint, mint(1));
        assert_eq!(swap.input_amount, 100);
        assert_eq!(swap.output_mint, mint(2));
        assert_eq!(swap.output_amount, 83);
        assert_eq!(swap.amm, Some(mint(8)));
    }

    #[test]
    fn no_legs_aggregates_to_nothing() {
        assert_eq!(aggregate_legs(&[]).unwrap(), None);
    }

    #[test]
    fn overflowing_sum_is_an_error() {
        let legs = [leg(1, u64::MAX, 2, 1), leg(1, 1, 2, 1)];
        assert!(matches!(
            aggregate_legs(&legs),
            Err(Error::AmountOverflow { .. })
        ));
    }

    #[test]
    fn sums_are_order_independent_between_boundary_legs() {
        let mut seed = 0xFEED_u64;
        for _ in 0..2_000 {
            let fan = (lcg_next(&mut seed) % 6 + 1) as usize;
            let mut middle: Vec<RawSwap> = (0..fan)
                .map(|_| {
                    let input = if lcg_next(&mut seed) % 2 == 0 { 1 } else { 4 };
                    let output = if lcg_next(&mut seed) % 2 == 0 { 2 } else { 5 };
                    leg(
                        input,
                        lcg_next(&mut seed) % 1_000_000,
                        output,
                        lcg_next(&mut seed) % 1_000_000,
                    )
                })
                .collect();
            let first = leg(1, lcg_next(&mut seed) % 1_000, 5, 7);
            let last = leg(4, 3, 2, lcg_next(&mut seed) % 1_000);

            let mut legs = vec![first.clone()];
            legs.extend(middle.iter().cloned());
            legs.push(last.clone());
            let baseline = aggregate_legs(&legs).unwrap().unwrap();

            for i in (1..middle.len()).rev() {
                let j = (lcg_next(&mut seed) % (i as u64 + 1)) as usize;
                middle.swap(i, j);
            }
            let mut shuffled = vec![first];
            shuffled.extend(middle);
            shuffled.push(last);
            assert_eq!(aggregate_legs(&shuffled).unwrap().unwrap(), baseline);
        }
    }
}
