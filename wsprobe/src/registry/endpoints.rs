//! エンドポイントレジストリ

use crate::common::error::ProbeError;
use crate::types::endpoint::Endpoint;
use std::collections::HashSet;
use std::sync::Arc;

/// 順序付き・不変のエンドポイント一覧
///
/// クローンは内部の`Arc`を共有するだけで、リスト自体は複製しない。
#[derive(Debug, Clone)]
pub struct EndpointRegistry {
    endpoints: Arc<[Endpoint]>,
}

impl EndpointRegistry {
    /// URI一覧からレジストリを構築
    ///
    /// 空リスト、不正なURI、重複アドレスは起動時エラーとする。
    /// 重複を許すと同じ`endpoint`ラベルの系列が上書きし合うため。
    pub fn from_uris<I, S>(uris: I) -> Result<Self, ProbeError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut seen = HashSet::new();
        let mut endpoints = Vec::new();

        for uri in uris {
            let endpoint = Endpoint::parse(uri.as_ref())?;
            if !seen.insert(endpoint.address().to_string()) {
                return Err(ProbeError::DuplicateEndpoint(endpoint.address().to_string()));
            }
            endpoints.push(endpoint);
        }

        if endpoints.is_empty() {
            return Err(ProbeError::NoEndpoints);
        }

        Ok(Self {
            endpoints: endpoints.into(),
        })
    }

    /// 登録順のエンドポイント一覧
    pub fn list(&self) -> &[Endpoint] {
        &self.endpoints
    }

    /// 登録数
    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    /// 空か（構築時に拒否しているので常にfalse）
    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }
}
