//! 共有ドキュメント（ドキュメントエンジン）
//!
//! ルームごとに 1 つの `yrs::Doc` を持ち、`"content"` という名前の共有テキストに
//! コードを保持します。全文の読み書きに加えて、差分アップデートの生成・適用による
//! 収束マージも提供します。

use yrs::updates::decoder::Decode;
use yrs::{Doc, GetString, ReadTxn, Text, TextRef, Transact, Update};

use super::error::DocumentError;

/// 共有テキストの名前
const TEXT_NAME: &str = "content";

/// CRDT で裏打ちされたコードドキュメント
pub struct CodeDocument {
    doc: Doc,
}

impl CodeDocument {
    /// 空のドキュメントを作成
    pub fn new() -> Self {
        Self { doc: Doc::new() }
    }

    /// 初期内容を持つドキュメントを作成（ハイドレーション用）
    pub fn with_content(content: &str) -> Self {
        let document = Self::new();
        if !content.is_empty() {
            let text = document.text_ref();
            let mut txn = document.doc.transact_mut();
            text.insert(&mut txn, 0, content);
        }
        document
    }

    fn text_ref(&self) -> TextRef {
        self.doc.get_or_insert_text(TEXT_NAME)
    }

    /// 現在の全文を取得
    pub fn text(&self) -> String {
        let text = self.text_ref();
        let txn = self.doc.transact();
        text.get_string(&txn)
    }

    /// 全文を置き換える
    ///
    /// 既存の内容の削除と新しい内容の挿入を 1 トランザクションで行う。
    pub fn replace_text(&mut self, new_text: &str) {
        let text = self.text_ref();
        let mut txn = self.doc.transact_mut();
        let len = text.len(&txn);
        if len > 0 {
            text.remove_range(&mut txn, 0, len);
        }
        if !new_text.is_empty() {
            text.insert(&mut txn, 0, new_text);
        }
    }

    /// ドキュメント全体の状態を v1 アップデートとしてエンコード
    pub fn encode_state(&self) -> Vec<u8> {
        let txn = self.doc.transact();
        txn.encode_state_as_update_v1(&Default::default())
    }

    /// 他のレプリカから受け取った v1 アップデートを適用（収束マージ）
    pub fn apply_update(&mut self, update: &[u8]) -> Result<(), DocumentError> {
        let update = Update::decode_v1(update).map_err(|e| DocumentError::Decode(e.to_string()))?;
        let mut txn = self.doc.transact_mut();
        txn.apply_update(update)
            .map_err(|e| DocumentError::Apply(e.to_string()))
    }
}

impl Default for CodeDocument {
    fn default() -> Self {
        Self::new()
    }
}
