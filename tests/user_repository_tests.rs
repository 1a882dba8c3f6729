// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! User repository behaviour over the in-memory store.
//!
//! These tests verify that:
//! 1. Lookups of unknown users return `None`, never an error
//! 2. Profile writes are idempotent upserts that always onboard
//! 3. Directory pages cover every match exactly once

use chrono::Utc;
use mongodb::bson::oid::ObjectId;
use std::collections::HashSet;
use threads_directory::db::SortOrder;
use threads_directory::models::Thread;
use threads_directory::services::{FetchUsers, UpdateUser};

mod common;
use common::{memory_repository, profile, seed_users};

// ═══════════════════════════════════════════════════════════════════════════
// FETCH / UPDATE
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_fetch_unknown_user_is_none() {
    let (repo, _, _) = memory_repository();

    let user = repo.fetch_user("nobody").await.unwrap();
    assert!(user.is_none());
}

#[tokio::test]
async fn test_username_stored_lowercase() {
    let (repo, _, _) = memory_repository();

    repo.update_user(profile("user_1", "Bob", "Bob")).await.unwrap();

    let user = repo.fetch_user("user_1").await.unwrap().unwrap();
    assert_eq!(user.username, "bob");
    assert_eq!(user.name, "Bob");
}

#[tokio::test]
async fn test_update_is_idempotent() {
    let (repo, store, _) = memory_repository();

    repo.update_user(profile("user_1", "alice", "Alice")).await.unwrap();
    let first = repo.fetch_user("user_1").await.unwrap().unwrap();

    repo.update_user(profile("user_1", "alice", "Alice")).await.unwrap();
    let second = repo.fetch_user("user_1").await.unwrap().unwrap();

    assert_eq!(store.user_count(), 1);
    assert_eq!(second.object_id, first.object_id);
    assert_eq!(second.username, first.username);
    assert_eq!(second.name, first.name);
    assert_eq!(second.bio, first.bio);
    assert_eq!(second.image, first.image);
    assert_eq!(second.onboarded, first.onboarded);
    assert_eq!(second.created_at, first.created_at);
}

#[tokio::test]
async fn test_profile_edit_keeps_onboarded() {
    let (repo, _, _) = memory_repository();

    repo.update_user(profile("user_1", "alice", "Alice")).await.unwrap();

    let edit = UpdateUser {
        name: "Alice Liddell".to_string(),
        bio: None,
        path: "/profile/edit".to_string(),
        ..profile("user_1", "alice", "Alice")
    };
    repo.update_user(edit).await.unwrap();

    let user = repo.fetch_user("user_1").await.unwrap().unwrap();
    assert!(user.onboarded);
    assert_eq!(user.name, "Alice Liddell");
    assert_eq!(user.bio, None);
}

// ═══════════════════════════════════════════════════════════════════════════
// USER POSTS
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_user_posts_without_threads() {
    let (repo, _, _) = memory_repository();
    repo.update_user(profile("user_1", "alice", "Alice")).await.unwrap();

    let posts = repo.fetch_user_posts("user_1").await.unwrap().unwrap();

    assert_eq!(posts.user.external_id, "user_1");
    assert!(posts.threads.is_empty());
}

#[tokio::test]
async fn test_user_posts_unknown_user() {
    let (repo, _, _) = memory_repository();
    assert!(repo.fetch_user_posts("nobody").await.unwrap().is_none());
}

#[tokio::test]
async fn test_user_posts_resolve_reply_authors() {
    let (repo, store, _) = memory_repository();
    repo.update_user(profile("user_1", "alice", "Alice")).await.unwrap();
    repo.update_user(profile("user_2", "bob", "Bob")).await.unwrap();

    let alice = repo.fetch_user("user_1").await.unwrap().unwrap();
    let bob = repo.fetch_user("user_2").await.unwrap().unwrap();

    let post = Thread {
        id: ObjectId::new(),
        text: "Hello threads".to_string(),
        author: alice.object_id.unwrap(),
        community: None,
        parent_id: None,
        children: vec![],
        created_at: Utc::now(),
    };
    let reply = Thread {
        id: ObjectId::new(),
        text: "Welcome!".to_string(),
        author: bob.object_id.unwrap(),
        community: None,
        parent_id: Some(post.id),
        children: vec![],
        created_at: Utc::now(),
    };
    store.insert_thread(post.clone());
    store.insert_thread(reply.clone());

    let posts = repo.fetch_user_posts("user_1").await.unwrap().unwrap();

    assert_eq!(posts.threads.len(), 1);
    assert_eq!(posts.threads[0].text, "Hello threads");
    assert_eq!(posts.threads[0].children.len(), 1);

    let author = posts.threads[0].children[0].author.as_ref().unwrap();
    assert_eq!(author.external_id, "user_2");
    assert_eq!(author.name, "Bob");
    assert_eq!(author.image, bob.image);
}

// ═══════════════════════════════════════════════════════════════════════════
// DIRECTORY SEARCH
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_pagination_25_users_20_per_page() {
    let (repo, _, _) = memory_repository();
    seed_users(&repo, 25).await;
    // The requester is one more user who must not be counted
    repo.update_user(profile("me", "me", "Me")).await.unwrap();

    let first = repo.fetch_users(FetchUsers::for_user("me")).await.unwrap();
    assert_eq!(first.users.len(), 20);
    assert!(first.is_next);

    let second = repo
        .fetch_users(FetchUsers {
            page_number: 2,
            ..FetchUsers::for_user("me")
        })
        .await
        .unwrap();
    assert_eq!(second.users.len(), 5);
    assert!(!second.is_next);
}

#[tokio::test]
async fn test_sequential_pages_cover_each_user_once() {
    let (repo, _, _) = memory_repository();
    seed_users(&repo, 17).await;

    let mut seen = HashSet::new();
    let mut page_number = 1;
    loop {
        let page = repo
            .fetch_users(FetchUsers {
                page_number,
                page_size: 4,
                sort_by: SortOrder::Asc,
                ..FetchUsers::for_user("me")
            })
            .await
            .unwrap();

        for user in &page.users {
            assert!(seen.insert(user.external_id.clone()), "duplicate user");
        }

        if !page.is_next {
            break;
        }
        page_number += 1;
    }

    assert_eq!(seen.len(), 17);
    assert_eq!(page_number, 5);
}

#[tokio::test]
async fn test_sort_order() {
    let (repo, _, _) = memory_repository();
    seed_users(&repo, 3).await;

    let newest_first = repo.fetch_users(FetchUsers::for_user("me")).await.unwrap();
    let oldest_first = repo
        .fetch_users(FetchUsers {
            sort_by: SortOrder::Asc,
            ..FetchUsers::for_user("me")
        })
        .await
        .unwrap();

    let desc: Vec<&str> = newest_first.users.iter().map(|u| u.external_id.as_str()).collect();
    let mut asc: Vec<&str> = oldest_first.users.iter().map(|u| u.external_id.as_str()).collect();

    assert_eq!(asc, vec!["user_0", "user_1", "user_2"]);
    asc.reverse();
    assert_eq!(desc, asc);
}

#[tokio::test]
async fn test_search_is_case_insensitive() {
    let (repo, _, _) = memory_repository();
    repo.update_user(profile("user_1", "wonderland", "Alice")).await.unwrap();
    repo.update_user(profile("user_2", "bob", "Bob")).await.unwrap();

    let page = repo
        .fetch_users(FetchUsers {
            search_string: "alice".to_string(),
            ..FetchUsers::for_user("me")
        })
        .await
        .unwrap();

    assert_eq!(page.users.len(), 1);
    assert_eq!(page.users[0].external_id, "user_1");
    assert!(!page.is_next);
}

#[tokio::test]
async fn test_search_excludes_requester() {
    let (repo, _, _) = memory_repository();
    repo.update_user(profile("user_1", "alice", "Alice")).await.unwrap();
    repo.update_user(profile("user_2", "alice2", "Alice Two")).await.unwrap();

    let page = repo
        .fetch_users(FetchUsers {
            search_string: "ALICE".to_string(),
            ..FetchUsers::for_user("user_1")
        })
        .await
        .unwrap();

    let ids: Vec<&str> = page.users.iter().map(|u| u.external_id.as_str()).collect();
    assert_eq!(ids, vec!["user_2"]);
}

#[tokio::test]
async fn test_search_metacharacters_are_literal() {
    let (repo, _, _) = memory_repository();
    repo.update_user(profile("user_1", "dot.name", "Dot")).await.unwrap();
    repo.update_user(profile("user_2", "dotxname", "Other")).await.unwrap();

    let page = repo
        .fetch_users(FetchUsers {
            search_string: "t.n".to_string(),
            ..FetchUsers::for_user("me")
        })
        .await
        .unwrap();

    let ids: Vec<&str> = page.users.iter().map(|u| u.external_id.as_str()).collect();
    assert_eq!(ids, vec!["user_1"]);

    // A pattern that would be invalid as a regex still works as text
    let page = repo
        .fetch_users(FetchUsers {
            search_string: "(unclosed".to_string(),
            ..FetchUsers::for_user("me")
        })
        .await
        .unwrap();
    assert!(page.users.is_empty());
}

#[tokio::test]
async fn test_blank_search_lists_everyone_else() {
    let (repo, _, _) = memory_repository();
    seed_users(&repo, 3).await;

    let page = repo
        .fetch_users(FetchUsers {
            search_string: "   ".to_string(),
            ..FetchUsers::for_user("user_0")
        })
        .await
        .unwrap();

    assert_eq!(page.users.len(), 2);
}

#[tokio::test]
async fn test_page_zero_is_rejected() {
    let (repo, _, _) = memory_repository();

    let err = repo
        .fetch_users(FetchUsers {
            page_number: 0,
            ..FetchUsers::for_user("me")
        })
        .await
        .unwrap_err();

    assert!(err.is_invalid_query());
}
