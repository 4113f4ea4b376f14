/// 几何体加载和处理模块
///
/// 读取 OBJ / GLB / GLTF，合并为单个网格，并归一化为可直接上传的数据。
///
/// # 模块结构
///
/// - `vertex`: GPU 顶点布局
/// - `mesh`: 原始网格与处理后的网格
/// - `format`: 文件格式识别
/// - `loaders`: 各种格式的模型加载器
/// - `processor`: 居中、缩放、法线重建、属性补齐
/// - `texture`: 纹理加载与自动查找
/// - `discovery`: 未指定模型时的自动查找
/// - `pipeline`: 在工作线程中执行的完整加载流程
///
/// # 架构设计
///
/// ```text
/// 文件 (OBJ/GLB/GLTF)
///     ↓
/// Loader (ObjLoader/GltfLoader)
///     ↓
/// RawMesh ──→ processor ──→ MeshAsset (CPU侧数据)
///     ↓
/// Renderer (上传到GPU)
/// ```
///
/// # 使用示例
///
/// ```rust,no_run
/// use mesh_view::geometry::loaders::load_mesh;
/// use mesh_view::geometry::processor;
/// use std::path::Path;
///
/// let raw = load_mesh(Path::new("model.obj"))?;
/// let asset = processor::process(raw);
///
/// println!("顶点数: {}", asset.vertex_count());
/// println!("三角形数: {}", asset.face_count());
///
/// # Ok::<(), mesh_view::core::MeshViewError>(())
/// ```

pub mod discovery;
pub mod format;
pub mod loaders;
pub mod mesh;
pub mod pipeline;
pub mod processor;
pub mod texture;
pub mod vertex;

// 重新导出常用类型
pub use mesh::{MeshAsset, RawMesh};
pub use vertex::{ColorVertex, Vertex};
