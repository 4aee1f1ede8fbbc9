//! Repository tests against an in-memory SQLite database.

use courier_database::{
    initialize_test_database, ChatRepository, MessageRepository, MessageType, UserRepository,
};

#[tokio::test]
async fn user_lookup_by_public_id_and_username() {
    let pool = initialize_test_database().await.unwrap();
    let users = UserRepository::new(pool);

    let alice = users.create("alice").await.unwrap();
    assert!(!alice.disabled);

    let by_id = users.find_by_public_id(&alice.public_id).await.unwrap();
    assert_eq!(by_id, Some(alice.clone()));

    let by_name = users.find_by_username("alice").await.unwrap();
    assert_eq!(by_name, Some(alice));

    assert!(users.find_by_username("nobody").await.unwrap().is_none());
}

#[tokio::test]
async fn duplicate_usernames_are_rejected_by_the_schema() {
    let pool = initialize_test_database().await.unwrap();
    let users = UserRepository::new(pool);

    users.create("alice").await.unwrap();
    assert!(users.create("alice").await.is_err());
}

#[tokio::test]
async fn disabling_a_user_flips_the_flag() {
    let pool = initialize_test_database().await.unwrap();
    let users = UserRepository::new(pool);

    let alice = users.create("alice").await.unwrap();
    users.set_disabled(&alice.public_id, true).await.unwrap();

    let reloaded = users
        .find_by_public_id(&alice.public_id)
        .await
        .unwrap()
        .unwrap();
    assert!(reloaded.disabled);

    assert!(users.set_disabled("missing", true).await.is_err());
}

#[tokio::test]
async fn contacts_resolve_to_usernames() {
    let pool = initialize_test_database().await.unwrap();
    let users = UserRepository::new(pool);

    let alice = users.create("alice").await.unwrap();
    let bob = users.create("bob").await.unwrap();
    let carol = users.create("carol").await.unwrap();

    users.add_contact(alice.id, bob.id).await.unwrap();
    users.add_contact(alice.id, carol.id).await.unwrap();
    // adding twice is fine
    users.add_contact(alice.id, bob.id).await.unwrap();

    let contacts = users.contacts_of(&alice.public_id).await.unwrap();
    assert_eq!(contacts, vec!["bob", "carol"]);

    // contacts are directional
    assert!(users.contacts_of(&bob.public_id).await.unwrap().is_empty());

    assert!(users.contacts_of("missing").await.is_err());
}

#[tokio::test]
async fn direct_chat_is_found_in_either_member_order() {
    let pool = initialize_test_database().await.unwrap();
    let users = UserRepository::new(pool.clone());
    let chats = ChatRepository::new(pool);

    let alice = users.create("alice").await.unwrap();
    let bob = users.create("bob").await.unwrap();

    assert!(chats
        .find_direct_between(alice.id, bob.id)
        .await
        .unwrap()
        .is_none());

    let chat = chats.create_direct(alice.id, bob.id).await.unwrap();
    assert!(chat.is_direct);
    assert!(chat.name.is_none());

    let found = chats
        .find_direct_between(bob.id, alice.id)
        .await
        .unwrap()
        .expect("direct chat visible with members swapped");
    assert_eq!(found.id, chat.id);
}

#[tokio::test]
async fn direct_chat_lookup_with_the_same_user_twice_finds_nothing() {
    let pool = initialize_test_database().await.unwrap();
    let users = UserRepository::new(pool.clone());
    let chats = ChatRepository::new(pool);

    let alice = users.create("alice").await.unwrap();
    let bob = users.create("bob").await.unwrap();
    chats.create_direct(alice.id, bob.id).await.unwrap();

    // a single membership row must not satisfy both sides of the lookup,
    // or alice's chat with bob would be returned here
    assert!(chats
        .find_direct_between(alice.id, alice.id)
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn group_roster_lists_members_and_admins() {
    let pool = initialize_test_database().await.unwrap();
    let users = UserRepository::new(pool.clone());
    let chats = ChatRepository::new(pool);

    let alice = users.create("alice").await.unwrap();
    let bob = users.create("bob").await.unwrap();
    let carol = users.create("carol").await.unwrap();

    let group = chats
        .create_group("trio", "the three of us", alice.id, &[bob.id, carol.id])
        .await
        .unwrap();
    assert!(!group.is_direct);

    let roster = chats
        .group_roster_of(&group.public_id)
        .await
        .unwrap()
        .expect("group exists");
    assert_eq!(roster.members, vec!["alice", "bob", "carol"]);
    assert_eq!(roster.admins, vec!["alice"]);

    assert!(chats.group_roster_of("missing").await.unwrap().is_none());
}

#[tokio::test]
async fn direct_chats_have_no_group_roster() {
    let pool = initialize_test_database().await.unwrap();
    let users = UserRepository::new(pool.clone());
    let chats = ChatRepository::new(pool);

    let alice = users.create("alice").await.unwrap();
    let bob = users.create("bob").await.unwrap();
    let chat = chats.create_direct(alice.id, bob.id).await.unwrap();

    assert!(chats
        .group_roster_of(&chat.public_id)
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn appended_messages_come_back_newest_first() {
    let pool = initialize_test_database().await.unwrap();
    let users = UserRepository::new(pool.clone());
    let chats = ChatRepository::new(pool.clone());
    let messages = MessageRepository::new(pool);

    let alice = users.create("alice").await.unwrap();
    let bob = users.create("bob").await.unwrap();
    let chat = chats.create_direct(alice.id, bob.id).await.unwrap();

    messages
        .append(chat.id, "alice", "first", MessageType::Text, "2026-01-01T10:00:00+00:00")
        .await
        .unwrap();
    messages
        .append(chat.id, "bob", "second", MessageType::Image, "2026-01-01T10:00:01+00:00")
        .await
        .unwrap();

    assert_eq!(messages.count_by_chat(chat.id).await.unwrap(), 2);

    let listed = messages.list_by_chat(chat.id, 50, 0).await.unwrap();
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0].content, "second");
    assert_eq!(listed[0].message_type, MessageType::Image);
    assert_eq!(listed[1].content, "first");
    assert_eq!(listed[1].sender, "alice");
}

#[tokio::test]
async fn message_rows_keep_the_router_supplied_timestamp() {
    let pool = initialize_test_database().await.unwrap();
    let users = UserRepository::new(pool.clone());
    let chats = ChatRepository::new(pool.clone());
    let messages = MessageRepository::new(pool);

    let alice = users.create("alice").await.unwrap();
    let bob = users.create("bob").await.unwrap();
    let chat = chats.create_direct(alice.id, bob.id).await.unwrap();

    let stored = messages
        .append(chat.id, "alice", "hi", MessageType::Text, "2026-02-02T09:30:00+00:00")
        .await
        .unwrap();
    assert_eq!(stored.timestamp, "2026-02-02T09:30:00+00:00");

    let listed = messages.list_by_chat(chat.id, 1, 0).await.unwrap();
    assert_eq!(listed[0].timestamp, "2026-02-02T09:30:00+00:00");
}
