use proptest::prelude::*;
use std::collections::{BTreeMap, BTreeSet, HashSet};
use tagscope_core::prelude::*;

#[derive(Debug, Clone)]
enum Op {
    Create(EntityKind),
    Delete(usize),
    Open(usize),
    Close(usize),
    AddItem(usize, usize),
    RemoveItem(usize, usize),
    AttachTag(usize, usize),
    DetachTag(usize),
    AttachScanner(usize, usize),
    DetachScanner(usize),
    SetCapacity(usize, usize),
}

fn kind() -> impl Strategy<Value = EntityKind> {
    prop_oneof![
        Just(EntityKind::Bag),
        Just(EntityKind::Item),
        Just(EntityKind::Tag),
        Just(EntityKind::Scanner),
    ]
}

fn op() -> impl Strategy<Value = Op> {
    let idx = 0usize..8;
    prop_oneof![
        3 => kind().prop_map(Op::Create),
        1 => idx.clone().prop_map(Op::Delete),
        2 => idx.clone().prop_map(Op::Open),
        1 => idx.clone().prop_map(Op::Close),
        3 => (idx.clone(), idx.clone()).prop_map(|(b, i)| Op::AddItem(b, i)),
        1 => (idx.clone(), idx.clone()).prop_map(|(b, i)| Op::RemoveItem(b, i)),
        2 => (idx.clone(), idx.clone()).prop_map(|(t, i)| Op::AttachTag(t, i)),
        1 => idx.clone().prop_map(Op::DetachTag),
        2 => (idx.clone(), idx.clone()).prop_map(|(s, b)| Op::AttachScanner(s, b)),
        1 => idx.clone().prop_map(Op::DetachScanner),
        1 => (idx.clone(), 0usize..6).prop_map(|(b, n)| Op::SetCapacity(b, n)),
    ]
}

/// 按注册顺序取第 `index` 个指定类型的实体（取模），没有时返回 `None`
fn pick(session: &Session, kind: EntityKind, index: usize) -> Option<EntityId> {
    let ids: Vec<EntityId> = session
        .all()
        .map(Entity::id)
        .filter(|id| id.kind == kind)
        .collect();
    (!ids.is_empty()).then(|| ids[index % ids.len()])
}

fn apply(session: &mut Session, op: &Op) -> Option<CoreResult<Vec<Effect>>> {
    use EntityKind::{Bag as B, Item as I, Scanner as S, Tag as T};

    let result = match *op {
        Op::Create(kind) => session.create(kind).map(|_| Vec::new()),
        Op::Delete(i) => {
            let id = pick(session, EntityKind::ALL[i % 4], i)?;
            session.delete(id)
        }
        Op::Open(b) => {
            let b = pick(session, B, b)?;
            session.open(b)
        }
        Op::Close(b) => {
            let b = pick(session, B, b)?;
            session.close(b)
        }
        Op::AddItem(b, i) => {
            let (b, i) = (pick(session, B, b)?, pick(session, I, i)?);
            session.add_item(b, i)
        }
        Op::RemoveItem(b, i) => {
            let (b, i) = (pick(session, B, b)?, pick(session, I, i)?);
            session.remove_item(b, i)
        }
        Op::AttachTag(t, i) => {
            let (t, i) = (pick(session, T, t)?, pick(session, I, i)?);
            session.attach_tag(t, i)
        }
        Op::DetachTag(t) => {
            let t = pick(session, T, t)?;
            session.detach_tag(t)
        }
        Op::AttachScanner(s, b) => {
            let (s, b) = (pick(session, S, s)?, pick(session, B, b)?);
            session.attach_scanner(s, b)
        }
        Op::DetachScanner(s) => {
            let s = pick(session, S, s)?;
            session.detach_scanner(s)
        }
        Op::SetCapacity(b, n) => {
            let b = pick(session, B, b)?;
            session.set_max_items(b, n).map(|_| Vec::new())
        }
    };
    Some(result)
}

/// 每个扫描器按包记录的 RFID：只在放入带标签的物品时记录，
/// 物品离开包、标签离开物品或扫描器重新挂接时撤销
#[derive(Debug, Default)]
struct LedgerModel(BTreeMap<EntityId, BTreeMap<EntityId, BTreeSet<String>>>);

impl LedgerModel {
    fn forget_item(&mut self, prior: &Session, item: EntityId) {
        let Ok(item) = prior.item(item) else {
            return;
        };
        let (Some(bag), Some(rfid)) = (item.bag(), item.rfid()) else {
            return;
        };
        let Some(scanner) = prior.bag(bag).ok().and_then(Bag::attached_scanner) else {
            return;
        };
        if let Some(bags) = self.0.get_mut(&scanner) {
            if let Some(rfids) = bags.get_mut(&bag) {
                rfids.remove(rfid);
                if rfids.is_empty() {
                    bags.remove(&bag);
                }
            }
        }
    }

    /// 按操作前的会话状态更新模型（只在操作成功后调用）
    fn update(&mut self, prior: &Session, op: &Op) {
        use EntityKind::{Bag as B, Item as I, Scanner as S, Tag as T};

        match *op {
            Op::AddItem(b, i) => {
                let (Some(b), Some(i)) = (pick(prior, B, b), pick(prior, I, i)) else {
                    return;
                };
                let scanner = prior.bag(b).ok().and_then(Bag::attached_scanner);
                let rfid = prior.item(i).ok().and_then(Item::rfid);
                if let (Some(scanner), Some(rfid)) = (scanner, rfid) {
                    self.0
                        .entry(scanner)
                        .or_default()
                        .entry(b)
                        .or_default()
                        .insert(rfid.to_string());
                }
            }
            Op::RemoveItem(_, i) => {
                if let Some(i) = pick(prior, I, i) {
                    self.forget_item(prior, i);
                }
            }
            Op::DetachTag(t) => {
                let item = pick(prior, T, t)
                    .and_then(|t| prior.tag(t).ok())
                    .and_then(Tag::attached_item);
                if let Some(item) = item {
                    self.forget_item(prior, item);
                }
            }
            Op::AttachScanner(s, b) => {
                if let (Some(s), Some(b)) = (pick(prior, S, s), pick(prior, B, b)) {
                    if let Some(bags) = self.0.get_mut(&s) {
                        bags.remove(&b);
                    }
                }
            }
            Op::Delete(i) => {
                let Some(id) = pick(prior, EntityKind::ALL[i % 4], i) else {
                    return;
                };
                match id.kind {
                    B => {
                        for bags in self.0.values_mut() {
                            bags.remove(&id);
                        }
                    }
                    I => self.forget_item(prior, id),
                    T => {
                        if let Some(item) = prior.tag(id).ok().and_then(Tag::attached_item) {
                            self.forget_item(prior, item);
                        }
                    }
                    S => {
                        self.0.remove(&id);
                    }
                }
            }
            _ => {}
        }
    }

    fn check(&self, session: &Session) -> Result<(), TestCaseError> {
        for entity in session.all() {
            let Some(scanner) = entity.as_scanner() else {
                continue;
            };
            let ledger = scanner.ledger();
            let actual: BTreeMap<EntityId, BTreeSet<String>> = ledger
                .bags()
                .map(|bag| (bag, ledger.rfids_for(bag).cloned().unwrap_or_default()))
                .collect();
            let expected: BTreeMap<EntityId, BTreeSet<String>> = self
                .0
                .get(&entity.id())
                .map(|bags| {
                    bags.iter()
                        .filter(|(_, rfids)| !rfids.is_empty())
                        .map(|(bag, rfids)| (*bag, rfids.clone()))
                        .collect()
                })
                .unwrap_or_default();
            prop_assert_eq!(actual, expected, "ledger of {}", entity.id());
        }
        Ok(())
    }
}

fn snapshot(session: &Session) -> Vec<Entity> {
    session.all().cloned().collect()
}

fn check_invariants(session: &Session) -> Result<(), TestCaseError> {
    let ids: Vec<EntityId> = session.all().map(Entity::id).collect();
    let unique: HashSet<EntityId> = ids.iter().copied().collect();
    prop_assert_eq!(unique.len(), ids.len());

    for kind in EntityKind::ALL {
        let live: BTreeSet<u32> = ids
            .iter()
            .filter(|id| id.kind == kind)
            .map(|id| id.number)
            .collect();
        let outstanding: BTreeSet<u32> = session.names().outstanding(kind).collect();
        prop_assert_eq!(live, outstanding);
    }

    for entity in session.all() {
        let id = entity.id();
        match entity.data() {
            EntityData::Bag(bag) => {
                prop_assert!(bag.items().len() <= bag.max_items());
                for item in bag.items() {
                    prop_assert_eq!(session.item(*item).unwrap().bag(), Some(id));
                    prop_assert!(session.get(*item).unwrap().is_hidden());
                }
                if let Some(scanner) = bag.attached_scanner() {
                    prop_assert_eq!(session.scanner(scanner).unwrap().attached_bag(), Some(id));
                }
            }
            EntityData::Item(item) => {
                if let Some(bag) = item.bag() {
                    prop_assert!(session.bag(bag).unwrap().contains(id));
                }
                match item.attached_tag() {
                    Some(tag) => {
                        let tag = session.tag(tag).unwrap();
                        prop_assert_eq!(tag.attached_item(), Some(id));
                        prop_assert_eq!(item.rfid(), Some(tag.rfid()));
                    }
                    None => {
                        prop_assert_eq!(item.rfid(), None);
                    }
                }
                prop_assert_eq!(entity.is_hidden(), item.bag().is_some());
            }
            EntityData::Tag(tag) => {
                if let Some(item) = tag.attached_item() {
                    prop_assert_eq!(session.item(item).unwrap().attached_tag(), Some(id));
                }
                prop_assert_eq!(entity.is_hidden(), tag.attached_item().is_some());
            }
            EntityData::Scanner(scanner) => {
                if let Some(bag) = scanner.attached_bag() {
                    prop_assert_eq!(session.bag(bag).unwrap().attached_scanner(), Some(id));
                }
                prop_assert_eq!(entity.is_hidden(), scanner.attached_bag().is_some());

                let ledger = scanner.ledger();
                let scanned: BTreeSet<&str> = ledger.scanned().collect();
                for bag in ledger.bags() {
                    for rfid in ledger.rfids_for(bag).unwrap() {
                        prop_assert!(scanned.contains(rfid.as_str()));
                    }
                }
            }
        }
    }

    prop_assert!(session.visible().all(|entity| !entity.is_hidden()));
    Ok(())
}

proptest! {
    #[test]
    fn invariants_hold_after_every_operation(ops in proptest::collection::vec(op(), 1..80)) {
        let mut session = Session::default();
        let mut model = LedgerModel::default();
        for op in &ops {
            let prior = session.clone();
            let before = snapshot(&session);
            match apply(&mut session, op) {
                Some(Err(_)) => {
                    // 失败的调用不修改任何状态
                    prop_assert_eq!(&before, &snapshot(&session));
                }
                Some(Ok(_)) => model.update(&prior, op),
                None => {}
            }
            check_invariants(&session)?;
            model.check(&session)?;
        }
    }

    #[test]
    fn created_identifier_is_smallest_free(ops in proptest::collection::vec(any::<Option<u8>>(), 1..60)) {
        let mut session = Session::default();
        for op in ops {
            match op {
                Some(index) => {
                    if let Some(id) = pick(&session, EntityKind::Item, index as usize) {
                        session.delete(id).unwrap();
                    }
                }
                None => {
                    let live: BTreeSet<u32> = session
                        .all()
                        .map(|entity| entity.id().number)
                        .collect();
                    let expected = (1u32..).find(|n| !live.contains(n)).unwrap();
                    let id = session.create(EntityKind::Item).unwrap();
                    prop_assert_eq!(id.number, expected);
                }
            }
        }
    }

    #[test]
    fn add_beyond_capacity_always_fails(capacity in 0usize..6, extra in 1usize..4) {
        let mut session = Session::default();
        let bag = session.create(EntityKind::Bag).unwrap();
        session.set_max_items(bag, capacity).unwrap();
        session.open(bag).unwrap();

        for _ in 0..capacity {
            let item = session.create(EntityKind::Item).unwrap();
            session.add_item(bag, item).unwrap();
        }
        for _ in 0..extra {
            let item = session.create(EntityKind::Item).unwrap();
            prop_assert_eq!(
                session.add_item(bag, item),
                Err(CoreError::CapacityExceeded { bag, max_items: capacity })
            );
            prop_assert_eq!(session.bag(bag).unwrap().items().len(), capacity);
        }
    }

    #[test]
    fn ledger_matches_model(
        ops in proptest::collection::vec((any::<bool>(), 1u32..4, 0u8..5), 1..100)
    ) {
        let mut ledger = ScanLedger::new();
        let mut model: BTreeMap<EntityId, BTreeSet<String>> = BTreeMap::new();

        for (is_record, bag, rfid) in ops {
            let bag = EntityId::new(EntityKind::Bag, bag);
            if is_record {
                let rfid = format!("RFID-{}", rfid);
                ledger.record(&rfid, bag);
                model.entry(bag).or_default().insert(rfid);
            } else {
                let removed = model.remove(&bag).unwrap_or_default();
                let dropped: BTreeSet<String> = ledger.purge(bag).into_iter().collect();
                let still_held: BTreeSet<String> = model.values().flatten().cloned().collect();
                let expected: BTreeSet<String> = removed.difference(&still_held).cloned().collect();
                prop_assert_eq!(dropped, expected);
            }

            let scanned: BTreeSet<String> = ledger.scanned().map(str::to_string).collect();
            let union: BTreeSet<String> = model.values().flatten().cloned().collect();
            prop_assert_eq!(scanned, union);
            for (bag, rfids) in &model {
                prop_assert_eq!(ledger.rfids_for(*bag), Some(rfids));
            }
        }
    }

    #[test]
    fn deleting_bag_removes_contents(
        items in 0usize..6,
        tagged in 0usize..6,
        with_scanner in any::<bool>(),
    ) {
        let tagged = tagged.min(items);
        let mut session = Session::default();
        let bag = session.create(EntityKind::Bag).unwrap();
        session.set_max_items(bag, items).unwrap();
        session.open(bag).unwrap();
        let scanner = if with_scanner {
            let scanner = session.create(EntityKind::Scanner).unwrap();
            session.attach_scanner(scanner, bag).unwrap();
            Some(scanner)
        } else {
            None
        };

        let mut doomed = vec![bag];
        for n in 0..items {
            let item = session.create(EntityKind::Item).unwrap();
            if n < tagged {
                let tag = session.create(EntityKind::Tag).unwrap();
                session.attach_tag(tag, item).unwrap();
                doomed.push(tag);
            }
            session.add_item(bag, item).unwrap();
            doomed.push(item);
        }

        let effects = session.delete(bag).unwrap();
        let removed = effects
            .iter()
            .filter(|effect| matches!(effect, Effect::Removed(_)))
            .count();
        prop_assert_eq!(removed, items + tagged + 1);

        for id in doomed {
            prop_assert!(!session.contains(id));
            prop_assert!(!session.names().is_outstanding(id.kind, id.number));
        }
        if let Some(scanner) = scanner {
            let survivor = session.scanner(scanner).unwrap();
            prop_assert_eq!(survivor.attached_bag(), None);
            prop_assert!(survivor.ledger().is_empty());
        }
        prop_assert_eq!(session.all().count(), usize::from(with_scanner));
    }
}
