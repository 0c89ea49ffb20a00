mod common;

use common::*;
use ethereum_types::{Address, U256};
use ethers::types::Signature;
use rlp::Rlp;
use sentinela_core::utils::{gwei, keccak256};
use sentinela_core::FeeData;
use sentinela_remediation::{EmergencyTransfer, SubmissionStage, TransferOptions};
use std::sync::Arc;

fn funded_node(balance: U256) -> Arc<MockNode> {
    Arc::new(MockNode::new(NodeState {
        balance,
        nonce: 3,
        ..NodeState::default()
    }))
}

fn safe_address() -> Address {
    SAFE_ADDRESS.parse().unwrap()
}

#[tokio::test]
async fn sweep_sends_balance_minus_reserve() {
    let balance = ether(2);
    let node = funded_node(balance);
    let mover = EmergencyTransfer::new(node.clone(), fast_config());

    let result = mover
        .move_to_safety(&owner(), SAFE_ADDRESS, &TransferOptions::default())
        .await;
    assert!(result.success, "{:?}", result.error);
    assert_eq!(result.stage, SubmissionStage::Confirmed);

    let expected = balance - gwei(50) * 21_000u64;
    assert_eq!(result.amount_transferred, Some(expected));

    let sent = node.sent();
    assert_eq!(sent.len(), 1);
    let raw = &sent[0];
    assert_eq!(raw[0], 0x02);
    let tx = Rlp::new(&raw[1..]);
    assert_eq!(tx.val_at::<u64>(0).unwrap(), 10143);
    assert_eq!(tx.val_at::<u64>(1).unwrap(), 3);
    assert_eq!(tx.val_at::<U256>(4).unwrap(), U256::from(21_000u64));
    assert_eq!(tx.val_at::<Address>(5).unwrap(), safe_address());
    assert_eq!(tx.val_at::<U256>(6).unwrap(), expected);
}

#[tokio::test]
async fn transfer_is_signed_by_owner() {
    let node = funded_node(ether(1));
    let mover = EmergencyTransfer::new(node.clone(), fast_config());
    mover
        .move_to_safety(&owner(), SAFE_ADDRESS, &TransferOptions::default())
        .await;

    let raw = node.sent().remove(0);
    let tx = Rlp::new(&raw[1..]);
    assert_eq!(tx.item_count().unwrap(), 12);

    // payload de assinatura: 0x02 || rlp(9 primeiros campos)
    let mut stream = rlp::RlpStream::new_list(9);
    for i in 0..9 {
        stream.append_raw(tx.at(i).unwrap().as_raw(), 1);
    }
    let mut payload = vec![0x02];
    payload.extend_from_slice(&stream.out());

    let signature = Signature {
        v: tx.val_at::<u64>(9).unwrap() + 27,
        r: tx.val_at(10).unwrap(),
        s: tx.val_at(11).unwrap(),
    };
    let sighash = ethereum_types::H256(keccak256(&payload));
    assert_eq!(signature.recover(sighash).unwrap(), owner_address());
}

#[tokio::test]
async fn explicit_amount_is_sent_exactly() {
    let node = funded_node(ether(2));
    let mover = EmergencyTransfer::new(node.clone(), fast_config());

    let options = TransferOptions {
        amount: Some(ether(1)),
        ..Default::default()
    };
    let result = mover.move_to_safety(&owner(), SAFE_ADDRESS, &options).await;
    assert!(result.success);
    assert_eq!(result.amount_transferred, Some(ether(1)));

    let raw = node.sent().remove(0);
    assert_eq!(Rlp::new(&raw[1..]).val_at::<U256>(6).unwrap(), ether(1));
}

#[tokio::test]
async fn explicit_amount_above_available_is_refused() {
    let reserve = gwei(50) * 21_000u64;
    let node = funded_node(ether(1));
    let mover = EmergencyTransfer::new(node.clone(), fast_config());

    // um wei acima de saldo - reserva
    let options = TransferOptions {
        amount: Some(ether(1) - reserve + 1u64),
        ..Default::default()
    };
    let result = mover.move_to_safety(&owner(), SAFE_ADDRESS, &options).await;

    assert!(!result.success);
    assert_eq!(result.stage, SubmissionStage::NotSubmitted);
    assert!(result.error.unwrap().starts_with("Insufficient balance. Need"));
    assert!(node.sent().is_empty());
    assert!(node.state.lock().estimates.is_empty());
}

#[tokio::test]
async fn empty_wallet_has_nothing_to_move() {
    let node = funded_node(U256::zero());
    let mover = EmergencyTransfer::new(node.clone(), fast_config());

    let result = mover
        .move_to_safety(&owner(), SAFE_ADDRESS, &TransferOptions::default())
        .await;
    assert!(!result.success);
    assert_eq!(result.error.as_deref(), Some("No funds available to transfer"));
    assert!(node.sent().is_empty());
}

#[tokio::test]
async fn balance_below_reserve_is_refused() {
    let reserve = gwei(50) * 21_000u64;
    let node = funded_node(reserve);
    let mover = EmergencyTransfer::new(node.clone(), fast_config());

    let result = mover
        .move_to_safety(&owner(), SAFE_ADDRESS, &TransferOptions::default())
        .await;
    assert!(!result.success);
    assert!(result.error.unwrap().starts_with("Insufficient balance for gas fees"));
    assert!(node.sent().is_empty());
}

#[tokio::test]
async fn fallback_fee_when_network_has_no_estimate() {
    let node = funded_node(ether(1));
    node.state.lock().fees = FeeData::default();
    let mover = EmergencyTransfer::new(node.clone(), fast_config());

    let result = mover
        .move_to_safety(&owner(), SAFE_ADDRESS, &TransferOptions::default())
        .await;
    assert_eq!(result.amount_transferred, Some(ether(1) - gwei(20) * 21_000u64));
}

#[tokio::test]
async fn dry_run_estimates_without_sending() {
    let node = funded_node(ether(1));
    let mover = EmergencyTransfer::new(node.clone(), fast_config());

    let options = TransferOptions {
        dry_run: true,
        ..Default::default()
    };
    let result = mover.move_to_safety(&owner(), SAFE_ADDRESS, &options).await;

    assert!(result.success);
    assert_eq!(result.stage, SubmissionStage::Simulated);
    assert!(result.transaction_hash.is_none());
    assert!(node.sent().is_empty());

    let state = node.state.lock();
    assert_eq!(state.estimates.len(), 1);
    assert_eq!(state.estimates[0].to, Some(safe_address()));
    assert_eq!(state.estimates[0].value, result.amount_transferred);
}

#[tokio::test]
async fn dry_run_failure_is_reported() {
    let node = funded_node(ether(1));
    node.state.lock().fail_estimate = true;
    let mover = EmergencyTransfer::new(node.clone(), fast_config());

    let options = TransferOptions {
        dry_run: true,
        ..Default::default()
    };
    let result = mover.move_to_safety(&owner(), SAFE_ADDRESS, &options).await;
    assert!(!result.success);
    assert!(result.error.unwrap().starts_with("Dry run failed"));
}

#[tokio::test]
async fn invalid_destination_is_rejected_before_reads() {
    let node = funded_node(ether(1));
    node.state.lock().fail_reads = true;
    let mover = EmergencyTransfer::new(node.clone(), fast_config());

    for destination in ["not-an-address", "0x0000000000000000000000000000000000000000"] {
        let result = mover
            .move_to_safety(&owner(), destination, &TransferOptions::default())
            .await;
        assert!(!result.success);
        assert!(result.error.unwrap().starts_with("Invalid destination"));
    }

    let own = format!("{:?}", owner_address());
    let result = mover.move_to_safety(&owner(), &own, &TransferOptions::default()).await;
    assert!(result.error.unwrap().starts_with("Invalid destination"));
}

#[tokio::test]
async fn transfer_cost_uses_max_fee() {
    let node = funded_node(ether(1));
    let mover = EmergencyTransfer::new(node, fast_config());

    let cost = mover.estimate_transfer_cost().await.unwrap();
    assert_eq!(cost.gas_limit, U256::from(21_000u64));
    assert_eq!(cost.gas_price, gwei(50));
    assert_eq!(cost.total_cost, gwei(50) * 21_000u64);
}
