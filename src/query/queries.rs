// region:    --- Listings
/// 상품 조회
pub const GET_LISTING: &str = r#"
    SELECT id, seller_id, title, description, brand, price, original_price, size, color, condition,
           category, silhouette, neckline, bust, waist, hip, length, images, status, created_at, updated_at
    FROM listings
    WHERE id = $1
"#;

/// 공개 상품 조회
pub const GET_PUBLISHED_LISTINGS: &str = r#"
    SELECT id, seller_id, title, description, brand, price, original_price, size, color, condition,
           category, silhouette, neckline, bust, waist, hip, length, images, status, created_at, updated_at
    FROM listings
    WHERE status = 'published'
    ORDER BY created_at DESC
"#;

/// 판매자 상품 조회
pub const GET_SELLER_LISTINGS: &str = r#"
    SELECT id, seller_id, title, description, brand, price, original_price, size, color, condition,
           category, silhouette, neckline, bust, waist, hip, length, images, status, created_at, updated_at
    FROM listings
    WHERE seller_id = $1
    ORDER BY updated_at DESC
"#;

/// 즐겨찾기 상품 조회
pub const GET_FAVORITE_LISTINGS: &str = r#"
    SELECT l.id, l.seller_id, l.title, l.description, l.brand, l.price, l.original_price, l.size, l.color,
           l.condition, l.category, l.silhouette, l.neckline, l.bust, l.waist, l.hip, l.length, l.images,
           l.status, l.created_at, l.updated_at
    FROM favorites f
    JOIN listings l ON l.id = f.listing_id
    WHERE f.user_id = $1 AND (l.status IN ('published', 'sold') OR l.seller_id = $1)
    ORDER BY f.created_at DESC
"#;

/// 최근 본 상품 조회
pub const GET_VIEW_HISTORY: &str = r#"
    SELECT l.id, l.seller_id, l.title, l.description, l.brand, l.price, l.original_price, l.size, l.color,
           l.condition, l.category, l.silhouette, l.neckline, l.bust, l.waist, l.hip, l.length, l.images,
           l.status, l.created_at, l.updated_at
    FROM view_history h
    JOIN listings l ON l.id = h.listing_id
    WHERE h.user_id = $1 AND (l.status IN ('published', 'sold') OR l.seller_id = $1)
    ORDER BY h.viewed_at DESC
"#;

/// 브랜드 목록 조회
pub const GET_BRANDS: &str = "SELECT id, name FROM brands ORDER BY name";
// endregion: --- Listings

// region:    --- Messaging
/// 대화방 조회
pub const GET_CONVERSATION: &str =
    "SELECT id, listing_id, buyer_id, seller_id, created_at, updated_at FROM conversations WHERE id = $1";

/// 사용자 대화방 목록 (최근 메시지, 안 읽은 수)
pub const GET_CONVERSATION_SUMMARIES: &str = r#"
    SELECT c.id, c.listing_id, l.title AS listing_title, l.images[1] AS listing_image,
           c.buyer_id, c.seller_id,
           (SELECT m.body FROM messages m WHERE m.conversation_id = c.id
             ORDER BY m.created_at DESC, m.id DESC LIMIT 1) AS last_message,
           (SELECT m.created_at FROM messages m WHERE m.conversation_id = c.id
             ORDER BY m.created_at DESC, m.id DESC LIMIT 1) AS last_message_at,
           (SELECT COUNT(*) FROM messages m WHERE m.conversation_id = c.id
             AND m.sender_id <> $1 AND NOT m.is_read) AS unread_count,
           c.updated_at
    FROM conversations c
    JOIN listings l ON l.id = c.listing_id
    WHERE c.buyer_id = $1 OR c.seller_id = $1
    ORDER BY c.updated_at DESC
"#;

/// 메시지 조회
pub const GET_MESSAGES: &str = r#"
    SELECT id, conversation_id, sender_id, body, is_read, created_at
    FROM messages
    WHERE conversation_id = $1
    ORDER BY created_at ASC, id ASC
"#;
// endregion: --- Messaging

// region:    --- Checkout
/// 체크아웃 조회
pub const GET_CHECKOUT: &str = r#"
    SELECT payment_intent_id, listing_id, buyer_id, amount, shipping, created_at
    FROM checkouts
    WHERE payment_intent_id = $1
"#;

/// 상품 이벤트 버전 조회
pub const GET_LISTING_VERSION: &str =
    "SELECT COALESCE(MAX(version), 0) AS version FROM events WHERE aggregate_id = $1";

/// 상품 결제 완료 이벤트 수 조회
pub const COUNT_PAYMENT_EVENTS: &str =
    "SELECT COUNT(*) AS count FROM events WHERE aggregate_id = $1 AND event_type = 'PaymentSucceeded'";

/// 특정 결제 의도의 완료 이벤트 수 조회
pub const COUNT_INTENT_PAYMENT_EVENTS: &str = "SELECT COUNT(*) AS count FROM events
     WHERE event_type = 'PaymentSucceeded' AND data -> 'PaymentSucceeded' ->> 'payment_intent_id' = $1";
// endregion: --- Checkout

// region:    --- Payouts
/// 판매 이력 조회
pub const GET_SELLER_SALES: &str = r#"
    SELECT id, listing_id, seller_id, buyer_id, payment_intent_id, amount, platform_fee, net_amount,
           status, withdrawal_id, shipping, created_at
    FROM sales
    WHERE seller_id = $1
    ORDER BY created_at DESC
"#;

/// 잔액 조회
pub const GET_BALANCE: &str = r#"
    SELECT COALESCE(SUM(net_amount) FILTER (WHERE status = 'pending'), 0)::BIGINT AS pending,
           COALESCE(SUM(net_amount) FILTER (WHERE status = 'completed'), 0)::BIGINT AS available,
           COALESCE(SUM(net_amount) FILTER (WHERE status = 'withdrawn'), 0)::BIGINT AS withdrawn
    FROM sales
    WHERE seller_id = $1
"#;

/// 출금 이력 조회
pub const GET_WITHDRAWALS: &str = r#"
    SELECT id, seller_id, bank_account_id, amount, status, created_at
    FROM withdrawals
    WHERE seller_id = $1
    ORDER BY created_at DESC
"#;

/// 계좌 목록 조회
pub const GET_BANK_ACCOUNTS: &str = r#"
    SELECT id, seller_id, bank_name, branch_name, account_type, account_number, account_holder,
           is_default, created_at
    FROM bank_accounts
    WHERE seller_id = $1
    ORDER BY is_default DESC, created_at ASC
"#;
// endregion: --- Payouts

// region:    --- Profiles
/// 프로필 조회
pub const GET_PROFILE: &str = "SELECT id, email, display_name, created_at FROM profiles WHERE id = $1";
// endregion: --- Profiles
